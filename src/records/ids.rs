/// Hands out record ids seeded from wall-clock milliseconds. Two records
/// created in the same millisecond still get distinct ids because every id is
/// strictly greater than the previous one.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Make sure future ids land above an id that is already in use.
    pub fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }

    pub fn next(&mut self, now_millis: u64) -> u64 {
        let id = now_millis.max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}
