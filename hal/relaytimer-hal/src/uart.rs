//! Serial link abstractions
//!
//! The command console talks to the host over a byte stream. Boards with a
//! driver implementing `embedded-io` can use [`IoSerial`] instead of
//! implementing these traits by hand.

/// Serial transmitter
pub trait UartTx {
    type Error;

    /// Write all of `data`, blocking until it has been queued
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Serial receiver
pub trait UartRx {
    type Error;

    /// Read at least one byte into `buf`
    ///
    /// Blocks until data is available. Returns the number of bytes read;
    /// zero means the link is closed.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Adapter exposing an `embedded-io` port as [`UartTx`] / [`UartRx`]
pub struct IoSerial<T> {
    port: T,
}

impl<T> IoSerial<T> {
    pub fn new(port: T) -> Self {
        Self { port }
    }

    pub fn inner(&self) -> &T {
        &self.port
    }

    pub fn into_inner(self) -> T {
        self.port
    }
}

impl<T: embedded_io::Write> UartTx for IoSerial<T> {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.port.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.port.flush()
    }
}

impl<T: embedded_io::Read> UartRx for IoSerial<T> {
    type Error = T::Error;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.port.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct Sink {
        data: std::vec::Vec<u8>,
        flushes: usize,
    }

    impl embedded_io::ErrorType for Sink {
        type Error = Infallible;
    }

    impl embedded_io::Write for Sink {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_read_from_io_port() {
        let mut serial = IoSerial::new(&b"B\n"[..]);
        let mut buf = [0u8; 8];
        assert_eq!(serial.read_blocking(&mut buf), Ok(2));
        assert_eq!(&buf[..2], b"B\n");
        assert_eq!(serial.read_blocking(&mut buf), Ok(0));
    }

    #[test]
    fn test_write_to_io_port() {
        let mut serial = IoSerial::new(Sink::default());
        serial.write_blocking(b">B OK").unwrap();
        serial.write_blocking(b"\n").unwrap();
        serial.flush().unwrap();

        let sink = serial.into_inner();
        assert_eq!(sink.data, b">B OK\n");
        assert_eq!(sink.flushes, 1);
    }
}
