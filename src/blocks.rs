//! Convenient module collecting every block for a single `use`.
pub use crate::arbiter::Arbiter;
pub use crate::bit_state::BitState;
pub use crate::collator::Collator;
pub use crate::const_source::ConstSource;
pub use crate::copy::Copy;
pub use crate::event::Event;
pub use crate::gate::Gate;
pub use crate::gate_packet::GatePacket;
pub use crate::head::Head;
pub use crate::join::Join;
pub use crate::mux_down::MuxDown;
pub use crate::mux_up::MuxUp;
pub use crate::op::{Add, AddSigned, BinaryOp, Max, Mul, MulSigned, Sum};
pub use crate::packet_split::PacketSplit;
pub use crate::packetiser::Packetiser;
pub use crate::ram::{DualPortMemory, RamToStream, StreamToRam};
pub use crate::router::Router;
pub use crate::select::Select;
pub use crate::sequencer::Sequencer;
pub use crate::sink::Sink;
pub use crate::split::Split;
pub use crate::stream_init::StreamInit;
pub use crate::stream_null::StreamNull;
pub use crate::stream_sync::StreamSync;
pub use crate::tee::Tee;
pub use crate::unary_op::{Abs, BitToN, Decimate, Delta, Enumerate};
