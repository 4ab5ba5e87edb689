//! Decode, dispatch and reply
//!
//! Each call to [`MessageDispatcher::handle_message`] decodes one message,
//! invokes at most one handler and sends exactly one reply.

use core::fmt::Write;

use crate::handlers::{HandlerError, MessageHandlers};
use crate::messages::{DecodeError, Request, MSG_RESET};
use crate::reply::Reply;

/// Why a message was not carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// The message did not decode
    Decode(DecodeError),
    /// No handler for this request
    MissingHandler,
    /// The handler refused the request
    Rejected,
    /// The reply could not be built or sent
    Reply,
}

impl From<DecodeError> for DispatchError {
    fn from(error: DecodeError) -> Self {
        DispatchError::Decode(error)
    }
}

impl From<HandlerError> for DispatchError {
    fn from(error: HandlerError) -> Self {
        match error {
            HandlerError::Missing => DispatchError::MissingHandler,
            HandlerError::Rejected => DispatchError::Rejected,
        }
    }
}

/// Owns the application handlers and a reply buffer
#[derive(Debug)]
pub struct MessageDispatcher<H> {
    handlers: H,
    reply: Reply,
}

impl<H: MessageHandlers> MessageDispatcher<H> {
    pub fn new(handlers: H) -> Self {
        Self {
            handlers,
            reply: Reply::new(),
        }
    }

    pub fn handlers(&self) -> &H {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut H {
        &mut self.handlers
    }

    pub fn into_handlers(self) -> H {
        self.handlers
    }

    /// Handle one complete message
    ///
    /// An empty message is rejected without a reply. Any other message
    /// gets a reply: a custom one for `GET_RTC`, `READ_INPUT` and `RESET`
    /// on success, otherwise `>` + tag + ` OK` / ` FAIL`.
    pub fn handle_message(&mut self, raw: &[u8]) -> Result<(), DispatchError> {
        let Some(&tag) = raw.first() else {
            warn!("empty message ignored");
            return Err(DispatchError::Decode(DecodeError::Empty));
        };

        let outcome = match Request::decode(raw) {
            Ok(request) => {
                debug!("dispatching {}", request.kind());
                self.execute(&request)
            }
            Err(error) => {
                warn!("message {=u8} rejected: {}", tag, error);
                Err(DispatchError::Decode(error))
            }
        };

        match outcome {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.reply.status(tag, true);
                self.send_reply()
            }
            Err(error) => {
                self.reply.status(tag, false);
                self.send_reply()?;
                Err(error)
            }
        }
    }

    /// Run the handler for `request`
    ///
    /// Returns `true` when the handler path already sent a custom reply.
    fn execute(&mut self, request: &Request<'_>) -> Result<bool, DispatchError> {
        let h = &mut self.handlers;
        match *request {
            Request::SetRtc(ref datetime) => h.set_rtc(datetime)?,
            Request::GetRtc => {
                let now = h.get_current_rtc()?;
                self.reply.begin(request.kind().tag());
                write!(self.reply, "{}", now).map_err(|_| DispatchError::Reply)?;
                self.send_reply()?;
                return Ok(true);
            }
            Request::SetAlarm { id, ref alarm } => h.set_alarm(id, alarm)?,
            Request::ClearAlarm(id) => h.clear_alarm(id)?,
            Request::SetTrigger { io, expression } => h.set_trigger(io, expression)?,
            Request::ClearTrigger(io) => h.clear_trigger(io)?,
            Request::SetIoType { io, direction } => h.set_io_type(io, direction)?,
            Request::ReadInput(io) => {
                let state = h.read_io_state(io)?;
                self.reply.begin(request.kind().tag());
                write!(self.reply, "{}", state.reply_char()).map_err(|_| DispatchError::Reply)?;
                self.send_reply()?;
                return Ok(true);
            }
            Request::Reset => {
                h.reset()?;
                self.reply.begin(MSG_RESET);
                self.reply
                    .push_bytes(b"RESET")
                    .map_err(|_| DispatchError::Reply)?;
                self.send_reply()?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn send_reply(&mut self) -> Result<(), DispatchError> {
        self.handlers
            .reply(self.reply.as_bytes())
            .map_err(|_| DispatchError::Reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerResult;
    use relaytimer_core::{Alarm, AlarmId, Datetime, IoDirection, IoIndex, IoState, Weekday};

    /// Records which handlers ran and what was replied
    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        replies: Vec<Vec<u8>>,
        rtc: Option<Datetime>,
        alarm: Option<(AlarmId, Alarm)>,
        trigger: Option<(IoIndex, String)>,
        io_type: Option<(IoIndex, IoDirection)>,
        inputs: [bool; 4],
        reject: bool,
    }

    impl Recorder {
        fn last_reply(&self) -> &[u8] {
            self.replies.last().map(Vec::as_slice).unwrap_or_default()
        }

        fn outcome(&self) -> HandlerResult {
            if self.reject {
                Err(HandlerError::Rejected)
            } else {
                Ok(())
            }
        }
    }

    impl MessageHandlers for Recorder {
        fn set_rtc(&mut self, datetime: &Datetime) -> HandlerResult {
            self.calls.push("set_rtc");
            self.rtc = Some(*datetime);
            self.outcome()
        }

        fn get_current_rtc(&mut self) -> HandlerResult<Datetime> {
            self.calls.push("get_current_rtc");
            Ok(Datetime::new(13, 4, 21, Weekday::Tuesday, 17, 42, 23).unwrap())
        }

        fn set_alarm(&mut self, id: AlarmId, alarm: &Alarm) -> HandlerResult {
            self.calls.push("set_alarm");
            self.alarm = Some((id, *alarm));
            self.outcome()
        }

        fn clear_alarm(&mut self, id: AlarmId) -> HandlerResult {
            self.calls.push("clear_alarm");
            self.alarm = Some((id, Alarm::default()));
            self.outcome()
        }

        fn set_trigger(&mut self, io: IoIndex, expression: &str) -> HandlerResult {
            self.calls.push("set_trigger");
            self.trigger = Some((io, expression.into()));
            self.outcome()
        }

        fn clear_trigger(&mut self, _io: IoIndex) -> HandlerResult {
            self.calls.push("clear_trigger");
            self.outcome()
        }

        fn set_io_type(&mut self, io: IoIndex, direction: IoDirection) -> HandlerResult {
            self.calls.push("set_io_type");
            self.io_type = Some((io, direction));
            self.outcome()
        }

        fn read_io_state(&mut self, io: IoIndex) -> HandlerResult<IoState> {
            self.calls.push("read_io_state");
            Ok(IoState::from(self.inputs[io.as_usize()]))
        }

        fn reset(&mut self) -> HandlerResult {
            self.calls.push("reset");
            self.outcome()
        }

        fn reply(&mut self, message: &[u8]) -> HandlerResult {
            self.replies.push(message.into());
            Ok(())
        }
    }

    /// Only knows how to reply
    struct ReplyOnly(Vec<Vec<u8>>);

    impl MessageHandlers for ReplyOnly {
        fn reply(&mut self, message: &[u8]) -> HandlerResult {
            self.0.push(message.into());
            Ok(())
        }
    }

    fn dispatcher() -> MessageDispatcher<Recorder> {
        MessageDispatcher::new(Recorder::default())
    }

    #[test]
    fn test_set_rtc_valid() {
        let mut d = dispatcher();
        assert_eq!(d.handle_message(b"ASAT 15-08-01 18:07:37"), Ok(()));
        let r = d.handlers();
        assert_eq!(r.calls, ["set_rtc"]);
        let rtc = r.rtc.unwrap();
        assert_eq!((rtc.year, rtc.month, rtc.day), (15, 7, 1));
        assert_eq!(rtc.weekday, Weekday::Saturday);
        assert_eq!(r.last_reply(), b">A OK");
    }

    #[test]
    fn test_invalid_messages_call_no_handler() {
        let mut d = dispatcher();
        for text in [
            "ASAT 15-00-01 18:07:37",
            "ASAT 15-13-01 18:07:37",
            "ASAT 15-02-29 18:07:37",
            "AMAN 15-02-28 18:07:37",
            "ASAT 15-04-31 18:07:37",
            "C",
            "C01 01A",
            "C01 01Y 13",
            "C01 01Y 12/31 2359",
            "C17 01Y",
            "C01 51Y",
            "D17",
            "G4 IN",
            "G1 XX",
            "H4",
            "Z",
        ] {
            assert!(d.handle_message(text.as_bytes()).is_err(), "{}", text);
            let mut expected = std::vec![b'>', text.as_bytes()[0]];
            expected.extend_from_slice(b" FAIL");
            assert_eq!(d.handlers().last_reply(), &expected[..], "{}", text);
        }
        assert!(d.handlers().calls.is_empty());
        assert_eq!(d.handlers().replies.len(), 16);
    }

    #[test]
    fn test_get_rtc_reply() {
        let mut d = dispatcher();
        assert_eq!(d.handle_message(b"B"), Ok(()));
        let reply = d.handlers().last_reply();
        assert_eq!(reply, b">BTUE 13-05-21 17:42:23");
        assert_eq!(reply.len(), 23);
        assert_eq!(d.handlers().replies.len(), 1);
    }

    #[test]
    fn test_set_alarm_forwards_alarm() {
        let mut d = dispatcher();
        assert_eq!(d.handle_message(b"C01 01W TUE 03:45"), Ok(()));
        let (id, alarm) = d.handlers().alarm.unwrap();
        assert_eq!(id.get(), 1);
        assert_eq!(alarm.target().weekday, Weekday::Tuesday);
        assert_eq!(alarm.duration_minutes(), 60);
        assert_eq!(d.handlers().last_reply(), b">C OK");

        assert_eq!(d.handle_message(b"C16 01Y"), Ok(()));
        assert_eq!(d.handlers().alarm.unwrap().0.get(), 16);
    }

    #[test]
    fn test_clear_alarm() {
        let mut d = dispatcher();
        assert_eq!(d.handle_message(b"D16"), Ok(()));
        assert_eq!(d.handlers().alarm.unwrap().0.get(), 16);
        assert_eq!(d.handlers().last_reply(), b">D OK");
    }

    #[test]
    fn test_set_trigger_forwards_text() {
        let mut d = dispatcher();
        assert_eq!(d.handle_message(b"E0 1&2|A1"), Ok(()));
        let (io, text) = d.handlers().trigger.clone().unwrap();
        assert_eq!(io.get(), 0);
        assert_eq!(text, "1&2|A1");

        assert_eq!(d.handle_message(b"F0"), Ok(()));
        assert_eq!(d.handlers().calls, ["set_trigger", "clear_trigger"]);
    }

    #[test]
    fn test_set_io_type() {
        let mut d = dispatcher();
        assert_eq!(d.handle_message(b"G1 OUT"), Ok(()));
        assert_eq!(
            d.handlers().io_type,
            Some((IoIndex::new(1).unwrap(), IoDirection::Output))
        );
        assert_eq!(d.handle_message(b"G2 IN"), Ok(()));
        assert_eq!(
            d.handlers().io_type,
            Some((IoIndex::new(2).unwrap(), IoDirection::Input))
        );
    }

    #[test]
    fn test_read_input_replies_with_level() {
        let mut d = dispatcher();
        d.handlers_mut().inputs = [true, false, false, true];
        for (index, expected) in [(b'0', b'1'), (b'1', b'0'), (b'2', b'0'), (b'3', b'1')] {
            assert_eq!(d.handle_message(&[b'H', index]), Ok(()));
            assert_eq!(d.handlers().last_reply(), &[b'>', b'H', expected]);
        }
        assert!(d.handle_message(b"H4").is_err());
        assert_eq!(d.handlers().last_reply(), b">H FAIL");
    }

    #[test]
    fn test_reset_reply() {
        let mut d = dispatcher();
        assert_eq!(d.handle_message(b"I"), Ok(()));
        assert_eq!(d.handlers().calls, ["reset"]);
        assert_eq!(d.handlers().last_reply(), b">IRESET");
    }

    #[test]
    fn test_rejected_by_handler() {
        let mut d = dispatcher();
        d.handlers_mut().reject = true;
        assert_eq!(d.handle_message(b"D01"), Err(DispatchError::Rejected));
        assert_eq!(d.handlers().last_reply(), b">D FAIL");
        assert_eq!(d.handle_message(b"I"), Err(DispatchError::Rejected));
        assert_eq!(d.handlers().last_reply(), b">I FAIL");
    }

    #[test]
    fn test_missing_handlers_fail() {
        let mut d = MessageDispatcher::new(ReplyOnly(Vec::new()));
        assert_eq!(d.handle_message(b"B"), Err(DispatchError::MissingHandler));
        assert_eq!(d.handle_message(b"G1 OUT"), Err(DispatchError::MissingHandler));
        let replies = d.into_handlers().0;
        assert_eq!(replies, [b">B FAIL".to_vec(), b">G FAIL".to_vec()]);
    }

    #[test]
    fn test_empty_message_gets_no_reply() {
        let mut d = dispatcher();
        assert_eq!(
            d.handle_message(b""),
            Err(DispatchError::Decode(DecodeError::Empty))
        );
        assert!(d.handlers().replies.is_empty());
    }
}
