//! Unit tests for the user directory and its management service.
