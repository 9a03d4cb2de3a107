use uuid::Uuid;

/// Length of identifiers produced by [`RandomIds`].
pub const ID_LENGTH: usize = 8;

/// Produces identifiers for new pastes.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Short lowercase hex identifiers cut from a random v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn generate(&self) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(ID_LENGTH);
        id
    }
}
