//! Social proof attached to quotes. Kept apart from pricing so the numbers
//! never influence cost and can be swapped for a real review service.

use rand::rngs::StdRng;
use rand::{thread_rng, Rng, SeedableRng};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocialProof {
    pub rating: f32,
    pub review_count: u32,
}

pub trait Reputation: Send + Sync {
    fn social_proof(&self, forwarder_id: &str) -> SocialProof;
}

/// Fixed high-trust values for the house rate card.
#[derive(Debug, Clone, Copy)]
pub struct PlatformReputation {
    pub rating: f32,
    pub review_count: u32,
}

impl Default for PlatformReputation {
    fn default() -> Self {
        Self {
            rating: 4.8,
            review_count: 1250,
        }
    }
}

impl Reputation for PlatformReputation {
    fn social_proof(&self, _forwarder_id: &str) -> SocialProof {
        SocialProof {
            rating: self.rating,
            review_count: self.review_count,
        }
    }
}

/// Stable pseudo-random values keyed by (seed, forwarder id).
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededReputation {
    seed: u64,
}

impl SeededReputation {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, forwarder_id: &str) -> StdRng {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(forwarder_id.as_bytes());
        let digest = hasher.finalize();
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&digest);
        StdRng::from_seed(seed)
    }
}

impl Reputation for SeededReputation {
    fn social_proof(&self, forwarder_id: &str) -> SocialProof {
        draw(&mut self.rng_for(forwarder_id))
    }
}

/// Fresh values on every call. Only for parity with the legacy quote screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomReputation;

impl Reputation for RandomReputation {
    fn social_proof(&self, _forwarder_id: &str) -> SocialProof {
        draw(&mut thread_rng())
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R) -> SocialProof {
    let tenths: u32 = rng.gen_range(40..=50);
    SocialProof {
        rating: tenths as f32 / 10.0,
        review_count: rng.gen_range(20..520),
    }
}
