//! Transport-agnostic framed msgpack-RPC subsystem.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         RPC Stack                            │
//! │                                                              │
//! │  ┌───────────┐   ┌──────────┐   ┌────────────────────────┐   │
//! │  │ Transport │──▶│  Codec   │──▶│  Server (dispatcher)   │   │
//! │  │ (trait)   │   │ (framing)│   │  → Protocol tables     │   │
//! │  └───────────┘   └──────────┘   └────────────────────────┘   │
//! │       ▲                                    │                 │
//! │       │              ┌─────────────────────┘                 │
//! │       │              ▼                                       │
//! │  ┌───────────┐   ┌──────────────┐                            │
//! │  │ Transport │◀──│ Connection / │   (typed *Client stubs)    │
//! │  │ (write)   │   │ LocalClient  │                            │
//! │  └───────────┘   └──────────────┘                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod codec;
pub mod connection;
pub mod engine;
pub mod message;
pub mod protocol;
pub mod transport;

pub use client::{GenericClient, LocalClient, call_typed, notify_typed};
pub use codec::{CodecError, FrameDecoder, encode_frame};
pub use connection::Connection;
pub use engine::Server;
pub use message::{RpcMessage, SeqNumber, from_value, to_value};
pub use protocol::{CallContext, MethodType, Protocol, ServeHandlerDescription, TypeError, join_method_name};
pub use transport::{NullTransport, StreamTransport, Transport};
