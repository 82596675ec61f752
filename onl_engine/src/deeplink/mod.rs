mod resolver;

pub use resolver::{DeepLinkAction, DeepLinkResolver, Resolution, ResolverState};
