use std::cell::RefCell;
use std::io::{Result as IoResult, Write};
use std::rc::Rc;

/// Memory-backed writer for capturing what the shell prints.
///
/// Clones share the same buffer, so one handle can be given to an
/// [`Interpreter`](crate::Interpreter) while another is kept to read the bytes back.
/// Only in-process output is captured; external commands write to the real
/// file descriptors they inherit.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }

    /// Drop everything written so far.
    pub fn clear(&self) {
        self.buf.borrow_mut().clear();
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let mut writer = MemWriter::new();
        let reader = writer.clone();
        write!(writer, "hello").unwrap();
        writeln!(writer, " world").unwrap();

        assert_eq!(reader.contents(), "hello world\n");

        reader.clear();
        assert_eq!(writer.contents(), "");
    }
}
