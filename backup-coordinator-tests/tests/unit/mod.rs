//! Unit tests for configuration, backend selection, and spec composition

mod composer;
