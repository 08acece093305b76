//! Request and reply types for the name server operation surface.

mod requests;
mod responses;

pub use requests::RebindInfo;
pub use responses::{
    BindingInfo, ExistsReply, LookupReply, NameInfo, NameServerInfo, RebindReply, RebindResult,
    RenewReply, ScopeInfo, ScopeKeys,
};
