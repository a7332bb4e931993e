//! Fixed-format payloads returned in the data-in phase of the status-class commands
//!
//! Every payload is a `Packed` struct with a fixed size; multi-byte fields are big-endian.

mod inquiry;
pub use inquiry::*;

mod read_capacity;
pub use read_capacity::*;

mod read_format_capacities;
pub use read_format_capacities::*;

mod mode_parameter;
pub use mode_parameter::*;

mod request_sense;
pub use request_sense::*;

/// The immutable response set advertised by one logical unit
///
/// Built once at startup (usually in a `const`) and never re-derived per command.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct StaticDescriptors {
    pub inquiry: InquiryResponse,
    pub read_capacity: ReadCapacity10Response,
    pub format_capacities: ReadFormatCapacitiesResponse,
    pub mode_sense: ModeParameterHeader6,
}

impl StaticDescriptors {
    /// `block_count` is the number of addressable blocks, `block_size` their length in bytes.
    /// Panics if `block_count` is zero.
    pub const fn new(inquiry: InquiryResponse, block_count: u32, block_size: u32) -> Self {
        assert!(block_count > 0);
        StaticDescriptors {
            inquiry,
            read_capacity: ReadCapacity10Response { max_lba: block_count - 1, block_size },
            format_capacities: ReadFormatCapacitiesResponse::formatted(block_count, block_size),
            mode_sense: ModeParameterHeader6::DEFAULT,
        }
    }
}
