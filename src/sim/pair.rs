//! Buffer-pair bookkeeping for ping-pong rendering.

/// Role cursor for a buffer pair.
///
/// `target()` names the buffer the next pass writes and `source()` the buffer
/// it reads; the two are always distinct. The cursor is a plain `Copy` value:
/// each pass produces the next cursor with [`PingPong::flipped`] rather than
/// toggling shared state, so alternation is checkable without any graphics
/// context.
///
/// After a flip the buffer just written becomes the next `source()`, so once
/// at least one pass has run, `source()` always names the freshest state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingPong {
    active: usize,
}

impl PingPong {
    /// Cursor for a freshly seeded pair: buffer 0 is the first write target.
    pub fn new() -> Self {
        Self { active: 0 }
    }

    /// Index of the write target for the next pass.
    #[inline]
    pub fn target(self) -> usize {
        self.active
    }

    /// Index of the read source for the next pass.
    #[inline]
    pub fn source(self) -> usize {
        1 - self.active
    }

    /// Cursor after one pass: read and write roles exchange.
    #[inline]
    #[must_use]
    pub fn flipped(self) -> Self {
        Self {
            active: 1 - self.active,
        }
    }
}

/// Exactly two state buffers plus the role cursor.
///
/// Generic over the buffer type so the stepping logic can run against plain
/// in-memory buffers in tests and against GPU textures in the renderer. The
/// pair owns its buffers; both are released together when it drops.
#[derive(Debug)]
pub struct BufferPair<B> {
    buffers: [B; 2],
    cursor: PingPong,
}

impl<B> BufferPair<B> {
    /// Build a pair from two identically seeded buffers. Buffer 0 becomes
    /// the first write target.
    pub fn new(first: B, second: B) -> Self {
        Self {
            buffers: [first, second],
            cursor: PingPong::new(),
        }
    }

    /// Current role cursor.
    #[inline]
    pub fn cursor(&self) -> PingPong {
        self.cursor
    }

    /// Borrow the read source and write target for the next pass.
    ///
    /// The two references always point at different buffers.
    pub fn roles(&self) -> (&B, &B) {
        (
            &self.buffers[self.cursor.source()],
            &self.buffers[self.cursor.target()],
        )
    }

    /// Buffer holding the freshest fully written state.
    pub fn latest(&self) -> &B {
        &self.buffers[self.cursor.source()]
    }

    /// Index of the buffer holding the freshest fully written state.
    #[inline]
    pub fn latest_index(&self) -> usize {
        self.cursor.source()
    }

    /// Read-only access to one buffer by index, for diagnostics.
    pub fn buffer(&self, index: usize) -> &B {
        &self.buffers[index]
    }

    /// Advance the cursor after a pass.
    pub fn flip(&mut self) -> PingPong {
        self.cursor = self.cursor.flipped();
        self.cursor
    }
}
