use mongodb::bson::{Binary, Bson, spec::BinarySubtype};
use uuid::Uuid;

/// A `Uuid` in the form the driver writes it into a document: generic binary.
///
/// Build every `_id`/owner filter with this. `bson::to_bson` renders a
/// `Uuid` as a string, and a string never matches the stored binary.
pub fn uuid_to_bson(id: Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Generic,
        bytes: id.as_bytes().to_vec(),
    })
}
