//! Serial command console
//!
//! Pumps bytes from the host through the line assembler into the message
//! dispatcher, and writes each reply back followed by `\n`.

use relaytimer_hal::{FlexPin, RealTimeClock, UartRx, UartTx};
use relaytimer_protocol::{LineAssembler, MessageDispatcher};

use crate::controller::Controller;

/// Bytes read from the link per poll
const RX_CHUNK: usize = 16;

/// Command console bound to one controller
pub struct Console<R, P> {
    dispatcher: MessageDispatcher<Controller<R, P>>,
    assembler: LineAssembler,
}

impl<R: RealTimeClock, P: FlexPin> Console<R, P> {
    pub fn new(controller: Controller<R, P>) -> Self {
        Self {
            dispatcher: MessageDispatcher::new(controller),
            assembler: LineAssembler::new(),
        }
    }

    pub fn controller(&self) -> &Controller<R, P> {
        self.dispatcher.handlers()
    }

    pub fn controller_mut(&mut self) -> &mut Controller<R, P> {
        self.dispatcher.handlers_mut()
    }

    /// Read one chunk from `uart` and answer every completed line
    ///
    /// Returns the number of bytes consumed; zero means the link closed.
    /// Malformed lines and rejected requests are logged and answered, never
    /// returned as errors.
    pub fn poll<U, E>(&mut self, uart: &mut U) -> Result<usize, E>
    where
        U: UartRx<Error = E> + UartTx<Error = E>,
    {
        let mut buf = [0u8; RX_CHUNK];
        let len = uart.read_blocking(&mut buf)?;

        for &byte in &buf[..len] {
            match self.assembler.feed(byte) {
                Ok(Some(line)) => {
                    trace!("line of {} bytes", line.len());
                    // The failure reply is already queued
                    let _ = self.dispatcher.handle_message(&line);
                    self.flush_reply(uart)?;
                }
                Ok(None) => {}
                Err(_e) => warn!("line dropped: {}", _e),
            }
        }
        Ok(len)
    }

    /// Poll until the link closes
    pub fn run<U, E>(&mut self, uart: &mut U) -> Result<(), E>
    where
        U: UartRx<Error = E> + UartTx<Error = E>,
    {
        while self.poll(uart)? > 0 {}
        Ok(())
    }

    fn flush_reply<T: UartTx>(&mut self, uart: &mut T) -> Result<(), T::Error> {
        if let Some(reply) = self.dispatcher.handlers_mut().take_reply() {
            uart.write_blocking(&reply)?;
            uart.write_blocking(b"\n")?;
            uart.flush()?;
        }
        Ok(())
    }
}
