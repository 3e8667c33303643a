/// Rid is the stable physical identity of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rid {
    pub block_num: i32,
    pub slot: i32,
}

impl Rid {
    pub fn new(block_num: i32, slot: i32) -> Self {
        Self { block_num, slot }
    }
}

impl std::fmt::Display for Rid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[block {}, slot {}]", self.block_num, self.slot)
    }
}
