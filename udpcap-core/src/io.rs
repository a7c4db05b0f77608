//! Blocking read helpers shared by the driver and the capture reader

use std::io::{ErrorKind, Read};

/// Fill `buf` from `reader`, stopping early only at end of input.
///
/// Returns the number of bytes read; anything less than `buf.len()` means the
/// input is exhausted. Short reads from pipes are retried and interrupted
/// reads are restarted.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that hands out at most `step` bytes per call
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
        interrupted: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_read_full_exact() {
        let mut reader = Cursor::new(vec![1u8; 10]);
        let mut buf = [0u8; 4];
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 4);
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 4);
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 2);
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_read_full_joins_short_reads() {
        let mut reader = Trickle {
            data: (0..100u8).collect(),
            pos: 0,
            step: 7,
            interrupted: false,
        };
        let mut buf = [0u8; 64];
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 64);
        assert_eq!(buf[63], 63);
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 36);
    }

    #[test]
    fn test_read_full_propagates_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(ErrorKind::BrokenPipe, "gone"))
            }
        }

        let mut buf = [0u8; 8];
        let err = read_full(&mut Broken, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    }
}
