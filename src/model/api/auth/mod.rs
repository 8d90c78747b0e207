mod token;
mod voter;

pub use token::{AdminToken, AUTH_TOKEN_COOKIE};
pub use voter::{VoterConnect, VoterSession, MISSING_VOTER_ID, VOTER_COOKIE};
