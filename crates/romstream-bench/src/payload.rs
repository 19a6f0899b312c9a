//! The built-in benchmark payload.
//!
//! 32 KiB of pseudo-random signed bytes, generated at compile time so the
//! target image places it in slow storage like any other read-only table.

/// Payload length in bytes.
pub const PAYLOAD_LEN: usize = 32 * 1024;

/// Seed of [`PAYLOAD`].
pub const DEFAULT_SEED: u64 = 0x5EED_C0DE_0F_5EED;

/// Word-aligned read-only byte stream.
#[repr(C, align(4))]
pub struct Payload([i8; PAYLOAD_LEN]);

struct WholeChunks<const N: usize>;

impl<const N: usize> WholeChunks<N> {
    const CHECK: () = assert!(
        N > 0 && PAYLOAD_LEN % N == 0,
        "chunk size must divide the payload"
    );
}

impl Payload {
    /// Deterministic xorshift stream for `seed`.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn generate(seed: u64) -> Self {
        let mut bytes = [0i8; PAYLOAD_LEN];
        // xorshift has a fixed point at zero
        let mut state = seed | 1;
        let mut i = 0;
        while i < PAYLOAD_LEN {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            bytes[i] = i8::from_ne_bytes([(state >> 56) as u8]);
            i += 1;
        }
        Self(bytes)
    }

    /// The whole stream.
    pub const fn as_array(&self) -> &[i8; PAYLOAD_LEN] {
        &self.0
    }

    /// The stream as `N`-byte chunks. `N` must divide [`PAYLOAD_LEN`].
    pub fn chunks<const N: usize>(&self) -> &[[i8; N]] {
        let () = WholeChunks::<N>::CHECK;
        self.0.as_chunks::<N>().0
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payload")
            .field("len", &PAYLOAD_LEN)
            .field("head", &&self.0[..8])
            .finish()
    }
}

/// The payload every strategy streams.
pub static PAYLOAD: Payload = Payload::generate(DEFAULT_SEED);
