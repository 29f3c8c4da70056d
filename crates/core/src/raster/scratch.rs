use bumpalo::Bump;

/// Page-scoped arena for scanner intermediates.
///
/// Raw segments and consumed-row spans of every scan on one page live here
/// and are released together when the page is done.
pub struct PageScratch {
    bump: Bump,
}

impl PageScratch {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    pub const fn bump(&self) -> &Bump {
        &self.bump
    }

    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Release every allocation at once.
    pub fn reset(&mut self) {
        self.bump.reset();
    }
}

impl Default for PageScratch {
    fn default() -> Self {
        Self::new()
    }
}
