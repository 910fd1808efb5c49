pub mod debug;
pub mod repr;

pub use repr::{
    HeaderField, Malformed, Request, Response, Slice, Status, Store, EMPTY_FIELD,
};
