//! JSON codec between records and the wire format of the remote service.

mod decode;
mod encode;
mod response;

pub use decode::{decode, decode_record, decode_result_set, DecodePolicy, Decoder};
pub use encode::{
    encode_delete, encode_delete_by_ids, encode_fields, encode_insert, encode_update_by_ids,
    encode_update_by_key, encode_update_by_records, NO_REVISION,
};
pub use response::{
    decode_error_response, decode_file_key, decode_insert_response, ErrorResponse, InsertResult,
};
