// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use finscore_domain::User;
use tracing::debug;

use crate::error::PersistenceError;
use crate::repository::Repository;
use crate::table::Row;

impl Repository<User> {
    /// Retrieves the first user whose email matches exactly.
    ///
    /// The comparison is case-sensitive and untrimmed. If several rows share
    /// an email, the earliest one in the file wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or the matching row is
    /// malformed. Returns `Ok(None)` if no user has the email.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        debug!(email, "Looking up user by email");
        self.find_raw(|row: &Row| row.get("email") == Some(email))
            .await
    }
}
