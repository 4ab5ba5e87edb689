//! Relaytimer Command Protocol
//!
//! This crate defines the line-based text protocol used to configure the
//! relaytimer controller over a serial link: setting the clock, arming
//! alarms and triggers, configuring channel direction and reading inputs.
//!
//! # Protocol Overview
//!
//! Every message is one ASCII line of at most 32 bytes:
//! ```text
//! ┌─────┬───────────────────┬────────────┐
//! │ TAG │ BODY              │ TERMINATOR │
//! │ 1B  │ 0-31B fixed-field │ \r or \n   │
//! └─────┴───────────────────┴────────────┘
//! ```
//!
//! The controller answers each request with exactly one reply line that
//! starts with `>` and the request tag.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod dispatcher;
pub mod fields;
pub mod frame;
pub mod handlers;
pub mod messages;
pub mod reply;

pub use dispatcher::{DispatchError, MessageDispatcher};
pub use frame::{FrameError, LineAssembler, Message, MAX_MESSAGE_LEN};
pub use handlers::{HandlerError, HandlerResult, MessageHandlers};
pub use messages::{DecodeError, MessageKind, Request, REPLY_TAG};
pub use reply::Reply;
