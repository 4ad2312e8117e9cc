//! Typed attribute access and well-known session slots.
//!
//! The authentication layer keeps two things in the session besides its own
//! ad-hoc state: the profile of the logged-in user, and the URL a visitor
//! asked for before being sent off to an identity provider.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::context::SessionContext;
use crate::error::{Error, Result};
use crate::session::SessionStore;

/// Attribute holding the authenticated user's profile.
pub const USER_PROFILE: &str = "userProfile";

/// Suffix of the per-client requested-URL attribute.
const REQUESTED_URL_SUFFIX: &str = "$requestedUrl";

/// Attribute name under which the requested URL for `client_name` is kept.
pub fn requested_url_key(client_name: &str) -> String {
    format!("{client_name}{REQUESTED_URL_SUFFIX}")
}

impl SessionStore {
    /// Read an attribute and convert it into `T`.
    ///
    /// A stored value of the wrong shape is an [`Error::Serialization`],
    /// unlike a corrupt record, which reads as absent.
    pub async fn get_as<C, T>(&self, ctx: &mut C, name: &str) -> Result<Option<T>>
    where
        C: SessionContext + ?Sized,
        T: DeserializeOwned,
    {
        match self.get(ctx, name).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| Error::Serialization(format!("attribute '{name}': {e}"))),
            None => Ok(None),
        }
    }

    /// Convert `value` to JSON and store it as an attribute.
    pub async fn set_as<C, T>(&self, ctx: &mut C, name: &str, value: &T) -> Result<()>
    where
        C: SessionContext + ?Sized,
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        self.set(ctx, name, value).await
    }

    /// Remember where to send the visitor after authenticating with `client_name`.
    pub async fn save_requested_url<C>(&self, ctx: &mut C, client_name: &str, url: &str) -> Result<()>
    where
        C: SessionContext + ?Sized,
    {
        self.set_as(ctx, &requested_url_key(client_name), url).await
    }

    /// URL saved by [`save_requested_url`](Self::save_requested_url), if any.
    pub async fn requested_url<C>(&self, ctx: &mut C, client_name: &str) -> Result<Option<String>>
    where
        C: SessionContext + ?Sized,
    {
        self.get_as(ctx, &requested_url_key(client_name)).await
    }

    /// Store the authenticated user's profile.
    pub async fn save_user_profile<C, P>(&self, ctx: &mut C, profile: &P) -> Result<()>
    where
        C: SessionContext + ?Sized,
        P: Serialize,
    {
        self.set_as(ctx, USER_PROFILE, profile).await
    }

    /// The authenticated user's profile, if one was stored.
    pub async fn user_profile<C, P>(&self, ctx: &mut C) -> Result<Option<P>>
    where
        C: SessionContext + ?Sized,
        P: DeserializeOwned,
    {
        self.get_as(ctx, USER_PROFILE).await
    }
}
