/// BlockId identifies one block within a file by name and position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub filename: String,
    pub num: i32,
}

impl BlockId {
    pub fn new(filename: impl Into<String>, num: i32) -> BlockId {
        BlockId {
            filename: filename.into(),
            num,
        }
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[file {}, block {}]", self.filename, self.num)
    }
}
