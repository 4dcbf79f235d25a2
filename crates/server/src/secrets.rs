use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

use rand::RngCore;

/// Invite secrets carry 128 bits of entropy.
pub const INVITE_SECRET_BYTES: usize = 16;

/// Source of opaque invite secrets.
pub trait SecretGenerator: Send + Sync {
    fn invite_secret(&self) -> String;
}

/// Lower-case hex over bytes from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSecretGenerator;

impl SecretGenerator for OsSecretGenerator {
    fn invite_secret(&self) -> String {
        let mut bytes = [0_u8; INVITE_SECRET_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

/// Hands out a fixed sequence of secrets, then falls back to random ones.
#[derive(Debug, Default)]
pub struct ScriptedSecretGenerator {
    queued: Mutex<VecDeque<String>>,
}

impl ScriptedSecretGenerator {
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { queued: Mutex::new(secrets.into_iter().map(Into::into).collect()) }
    }
}

impl SecretGenerator for ScriptedSecretGenerator {
    fn invite_secret(&self) -> String {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| OsSecretGenerator.invite_secret())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{OsSecretGenerator, ScriptedSecretGenerator, SecretGenerator};

    #[test]
    fn os_secrets_are_32_hex_chars_and_distinct() {
        let generator = OsSecretGenerator;
        let secrets: HashSet<String> = (0..64).map(|_| generator.invite_secret()).collect();

        assert_eq!(secrets.len(), 64);
        for secret in &secrets {
            assert_eq!(secret.len(), 32);
            assert!(secret.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn scripted_generator_replays_then_randomizes() {
        let generator = ScriptedSecretGenerator::new(["first", "second"]);

        assert_eq!(generator.invite_secret(), "first");
        assert_eq!(generator.invite_secret(), "second");
        assert_eq!(generator.invite_secret().len(), 32);
    }
}
