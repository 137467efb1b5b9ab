//! Cross-crate tests for srcvault live under `tests/`.
