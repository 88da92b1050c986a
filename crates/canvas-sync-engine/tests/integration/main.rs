//! Integration tests for canvas-sync-engine
//!
//! The orchestrator tests drive a scripted transfer queue; the sync tests
//! run whole listings and downloads against a wiremock Canvas instance.


mod test_sync;
