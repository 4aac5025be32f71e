//! 带游标的字节缓冲区.
//!
//! 提供定长整数、浮点数、字节片段和 UTF-8 文本的边界检查读写,
//! 是码流重组和控制消息编解码的基础设施.
//!
//! 写入分为两条显式路径:
//! - `append_*`: 追加到缓冲区末尾, 缓冲区增长
//! - `overwrite_*_at`: 覆盖已写入区域内的字节, 缓冲区长度不变
//!
//! 后者用于先预留头部字段, 写完负载后再回填最终长度或校验和.

use byteorder::ByteOrder;

use crate::error::{LiuError, LiuResult};

/// 带游标的字节缓冲区
///
/// 不变量: 任何操作之后 `0 <= position <= len`.
///
/// # 示例
/// ```
/// use liu_core::{BigEndian, ByteCursor};
///
/// let mut cursor = ByteCursor::new();
/// cursor.append_u8(0x01).append_u16::<BigEndian>(0x0203);
/// assert_eq!(cursor.as_slice(), &[0x01, 0x02, 0x03]);
///
/// assert_eq!(cursor.read_u8().unwrap(), 0x01);
/// assert_eq!(cursor.read_u16::<BigEndian>().unwrap(), 0x0203);
/// assert!(cursor.read_u8().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteCursor {
    /// 缓冲区数据
    data: Vec<u8>,
    /// 当前读取位置
    position: usize,
}

impl ByteCursor {
    /// 创建空缓冲区
    pub fn new() -> Self {
        Self::default()
    }

    /// 以指定容量创建空缓冲区
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            position: 0,
        }
    }

    /// 缓冲区逻辑长度
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 缓冲区是否为空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 当前游标位置
    pub fn position(&self) -> usize {
        self.position
    }

    /// 游标之后剩余的字节数
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// 移动游标, 不允许超过缓冲区末尾
    pub fn set_position(&mut self, position: usize) -> LiuResult<()> {
        if position > self.data.len() {
            return Err(LiuError::BufferUnderrun {
                requested: position,
                remaining: self.data.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// 设置逻辑长度
    ///
    /// 变短时截断, 变长时以 0 填充. 游标超出新长度时被拉回末尾.
    pub fn set_len(&mut self, len: usize) {
        self.data.resize(len, 0);
        self.position = self.position.min(len);
    }

    /// 清空缓冲区并复位游标
    pub fn clear(&mut self) {
        self.data.clear();
        self.position = 0;
    }

    /// 获取全部数据
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// 取出内部数据
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// 随机访问读取单个字节
    pub fn get(&self, index: usize) -> LiuResult<u8> {
        self.data
            .get(index)
            .copied()
            .ok_or(LiuError::BufferUnderrun {
                requested: index.saturating_add(1),
                remaining: self.data.len(),
            })
    }

    /// 随机访问覆盖单个字节
    pub fn set(&mut self, index: usize, value: u8) -> LiuResult<()> {
        self.overwrite_at(index, &[value])
    }

    // ========================
    // 读取方法
    // ========================

    /// 消耗 `n` 个字节, 不足时不移动游标
    fn take(&mut self, n: usize) -> LiuResult<&[u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(LiuError::BufferUnderrun {
                requested: n,
                remaining,
            });
        }
        let start = self.position;
        self.position += n;
        Ok(&self.data[start..start + n])
    }

    /// 跳过指定字节数
    pub fn skip(&mut self, n: usize) -> LiuResult<()> {
        self.take(n).map(|_| ())
    }

    /// 读取 1 个字节
    pub fn read_u8(&mut self) -> LiuResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// 读取 u16
    pub fn read_u16<E: ByteOrder>(&mut self) -> LiuResult<u16> {
        Ok(E::read_u16(self.take(2)?))
    }

    /// 读取 u24 (3 字节无符号整数, 返回值高 8 位为 0)
    pub fn read_u24<E: ByteOrder>(&mut self) -> LiuResult<u32> {
        Ok(E::read_u24(self.take(3)?))
    }

    /// 读取 u32
    pub fn read_u32<E: ByteOrder>(&mut self) -> LiuResult<u32> {
        Ok(E::read_u32(self.take(4)?))
    }

    /// 读取 f64
    pub fn read_f64<E: ByteOrder>(&mut self) -> LiuResult<f64> {
        Ok(E::read_f64(self.take(8)?))
    }

    /// 读取字节片段 (借用)
    pub fn read_slice(&mut self, n: usize) -> LiuResult<&[u8]> {
        self.take(n)
    }

    /// 读取指定数量的字节
    pub fn read_bytes(&mut self, n: usize) -> LiuResult<Vec<u8>> {
        self.take(n).map(<[u8]>::to_vec)
    }

    /// 读取 `n` 字节 UTF-8 文本
    ///
    /// 文本非法时游标保持不动.
    pub fn read_utf8(&mut self, n: usize) -> LiuResult<String> {
        let start = self.position;
        let decoded = std::str::from_utf8(self.take(n)?).map(str::to_owned);
        match decoded {
            Ok(text) => Ok(text),
            Err(err) => {
                self.position = start;
                Err(LiuError::InvalidData(format!(
                    "UTF-8 文本非法: offset={}, {}",
                    start, err
                )))
            }
        }
    }

    // ========================
    // 追加方法
    // ========================

    /// 追加字节片段, 不移动游标
    pub fn append(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// 追加 1 个字节
    pub fn append_u8(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    /// 追加 u16
    pub fn append_u16<E: ByteOrder>(&mut self, value: u16) -> &mut Self {
        let mut buf = [0u8; 2];
        E::write_u16(&mut buf, value);
        self.append(&buf)
    }

    /// 追加 u24
    ///
    /// 只写出低 24 位, 高 8 位被忽略.
    pub fn append_u24<E: ByteOrder>(&mut self, value: u32) -> &mut Self {
        let mut buf = [0u8; 3];
        E::write_u24(&mut buf, value & 0x00FF_FFFF);
        self.append(&buf)
    }

    /// 追加 u32
    pub fn append_u32<E: ByteOrder>(&mut self, value: u32) -> &mut Self {
        let mut buf = [0u8; 4];
        E::write_u32(&mut buf, value);
        self.append(&buf)
    }

    /// 追加 f64
    pub fn append_f64<E: ByteOrder>(&mut self, value: f64) -> &mut Self {
        let mut buf = [0u8; 8];
        E::write_f64(&mut buf, value);
        self.append(&buf)
    }

    /// 追加 UTF-8 文本 (不含长度前缀)
    pub fn append_utf8(&mut self, text: &str) -> &mut Self {
        self.append(text.as_bytes())
    }

    // ========================
    // 覆盖方法
    // ========================

    /// 覆盖 `offset` 处的字节, 不允许越过已写入区域, 不移动游标
    pub fn overwrite_at(&mut self, offset: usize, bytes: &[u8]) -> LiuResult<()> {
        let end = offset.checked_add(bytes.len());
        match end {
            Some(end) if end <= self.data.len() => {
                self.data[offset..end].copy_from_slice(bytes);
                Ok(())
            }
            _ => Err(LiuError::BufferUnderrun {
                requested: bytes.len(),
                remaining: self.data.len().saturating_sub(offset),
            }),
        }
    }

    /// 覆盖 1 个字节
    pub fn overwrite_u8_at(&mut self, offset: usize, value: u8) -> LiuResult<()> {
        self.overwrite_at(offset, &[value])
    }

    /// 覆盖 u16
    pub fn overwrite_u16_at<E: ByteOrder>(&mut self, offset: usize, value: u16) -> LiuResult<()> {
        let mut buf = [0u8; 2];
        E::write_u16(&mut buf, value);
        self.overwrite_at(offset, &buf)
    }

    /// 覆盖 u24 (只写出低 24 位)
    pub fn overwrite_u24_at<E: ByteOrder>(&mut self, offset: usize, value: u32) -> LiuResult<()> {
        let mut buf = [0u8; 3];
        E::write_u24(&mut buf, value & 0x00FF_FFFF);
        self.overwrite_at(offset, &buf)
    }

    /// 覆盖 u32
    pub fn overwrite_u32_at<E: ByteOrder>(&mut self, offset: usize, value: u32) -> LiuResult<()> {
        let mut buf = [0u8; 4];
        E::write_u32(&mut buf, value);
        self.overwrite_at(offset, &buf)
    }
}

impl From<Vec<u8>> for ByteCursor {
    fn from(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }
}

impl From<&[u8]> for ByteCursor {
    fn from(data: &[u8]) -> Self {
        Self::from(data.to_vec())
    }
}

impl AsRef<[u8]> for ByteCursor {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use byteorder::{BigEndian, LittleEndian};

    #[test]
    fn test_read_big_endian_integers() {
        let mut cursor = ByteCursor::from(vec![
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x01,
        ]);
        assert_eq!(cursor.read_u8().unwrap(), 0x12);
        assert_eq!(cursor.read_u16::<BigEndian>().unwrap(), 0x3456);
        assert_eq!(cursor.read_u24::<BigEndian>().unwrap(), 0x789ABC);
        assert_eq!(cursor.read_u24::<BigEndian>().unwrap(), 0xDEF001);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_read_u24_no_sign_extension() {
        let mut cursor = ByteCursor::from(vec![0xFF, 0xFF, 0xFE]);
        assert_eq!(cursor.read_u24::<BigEndian>().unwrap(), 0x00FF_FFFE);
    }

    #[test]
    fn test_read_little_endian_integers() {
        let mut cursor = ByteCursor::from(vec![0x34, 0x12, 0x40, 0x02, 0x8E, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 0x1234);
        assert_eq!(cursor.read_u24::<LittleEndian>().unwrap(), 0x8E0240);
        assert_eq!(cursor.read_u32::<LittleEndian>().unwrap(), 0x0102_0304);
    }

    #[test]
    fn test_short_read_does_not_advance() {
        let mut cursor = ByteCursor::from(vec![0x00, 0x01, 0x02]);
        cursor.skip(1).unwrap();
        let err = cursor.read_u32::<BigEndian>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferUnderrun);
        assert!(matches!(
            err,
            LiuError::BufferUnderrun {
                requested: 4,
                remaining: 2
            }
        ));
        assert_eq!(cursor.position(), 1, "读取失败时游标不应移动");
        assert_eq!(cursor.read_u16::<BigEndian>().unwrap(), 0x0102);
    }

    #[test]
    fn test_f64_roundtrip() {
        let mut cursor = ByteCursor::new();
        cursor
            .append_f64::<BigEndian>(29.97)
            .append_f64::<LittleEndian>(-0.5);
        assert_eq!(cursor.len(), 16);
        assert_eq!(cursor.as_slice()[0], 0x40);
        assert_eq!(cursor.read_f64::<BigEndian>().unwrap(), 29.97);
        assert_eq!(cursor.read_f64::<LittleEndian>().unwrap(), -0.5);
    }

    #[test]
    fn test_utf8_read() {
        let mut cursor = ByteCursor::new();
        cursor.append_u8(4).append_utf8("mbln");
        let len = cursor.read_u8().unwrap() as usize;
        assert_eq!(cursor.read_utf8(len).unwrap(), "mbln");
    }

    #[test]
    fn test_utf8_invalid_keeps_position() {
        let mut cursor = ByteCursor::from(vec![0xC3, 0x28]);
        let err = cursor.read_utf8(2).unwrap_err();
        assert!(matches!(err, LiuError::InvalidData(_)));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_append_and_overwrite_header() {
        // 先预留长度字段, 写完负载后回填
        let mut cursor = ByteCursor::new();
        cursor.append_u32::<BigEndian>(0).append(&[0xAA, 0xBB, 0xCC]);
        let payload_len = (cursor.len() - 4) as u32;
        cursor.overwrite_u32_at::<BigEndian>(0, payload_len).unwrap();
        assert_eq!(cursor.as_slice(), &[0x00, 0x00, 0x00, 0x03, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_append_u24_big_endian() {
        let mut cursor = ByteCursor::new();
        cursor.append_u24::<BigEndian>(0x789ABC);
        assert_eq!(cursor.as_slice(), &[0x78, 0x9A, 0xBC]);
        assert_eq!(cursor.read_u24::<BigEndian>().unwrap(), 0x789ABC);
    }

    #[test]
    fn test_u24_writers_drop_high_byte() {
        let mut cursor = ByteCursor::new();
        cursor.append_u24::<BigEndian>(0x0100_0002);
        assert_eq!(cursor.as_slice(), &[0x00, 0x00, 0x02]);

        // 覆盖路径与追加路径行为一致
        cursor.overwrite_u24_at::<BigEndian>(0, 0xFF12_3456).unwrap();
        assert_eq!(cursor.as_slice(), &[0x12, 0x34, 0x56]);
    }

    #[test]
    fn test_overwrite_past_end_rejected() {
        let mut cursor = ByteCursor::from(vec![0x00, 0x00, 0x00]);
        assert!(cursor.overwrite_at(1, &[1, 2, 3]).is_err());
        assert!(cursor.overwrite_at(usize::MAX, &[1]).is_err());
        assert_eq!(cursor.as_slice(), &[0x00, 0x00, 0x00], "越界覆盖不应修改数据");
        cursor.overwrite_u24_at::<LittleEndian>(0, 0x030201).unwrap();
        assert_eq!(cursor.as_slice(), &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_random_access() {
        let mut cursor = ByteCursor::from(vec![0x10, 0x20]);
        assert_eq!(cursor.get(1).unwrap(), 0x20);
        assert!(cursor.get(2).is_err());
        cursor.set(0, 0x11).unwrap();
        assert_eq!(cursor.get(0).unwrap(), 0x11);
        assert!(cursor.set(2, 0x00).is_err());
    }

    #[test]
    fn test_set_len_truncates_and_extends() {
        let mut cursor = ByteCursor::from(vec![1, 2, 3, 4]);
        cursor.set_position(4).unwrap();
        cursor.set_len(2);
        assert_eq!(cursor.as_slice(), &[1, 2]);
        assert_eq!(cursor.position(), 2, "游标应被拉回新的末尾");
        cursor.set_len(4);
        assert_eq!(cursor.as_slice(), &[1, 2, 0, 0]);
        assert_eq!(cursor.remaining(), 2);
    }

    #[test]
    fn test_set_position_bounds() {
        let mut cursor = ByteCursor::from(vec![1, 2]);
        assert!(cursor.set_position(2).is_ok());
        assert!(cursor.set_position(3).is_err());
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_clear() {
        let mut cursor = ByteCursor::from(vec![1, 2, 3]);
        cursor.skip(2).unwrap();
        cursor.clear();
        assert!(cursor.is_empty());
        assert_eq!(cursor.position(), 0);
    }
}
