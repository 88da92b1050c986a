//! Integration tests for canvas-sync-api
//!
//! Uses wiremock to simulate a Canvas instance and verifies end-to-end
//! behavior of Link-header pagination, collection accumulation, the
//! GraphQL module listing, and single-file lookups.


mod test_collect;
mod test_files;
mod test_modules;
mod test_pagination;
