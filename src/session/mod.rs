pub(crate) mod viewer_session;
