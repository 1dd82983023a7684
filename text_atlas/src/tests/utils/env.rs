// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use linebender_resource_handle::Blob;

use super::{BoxEngine, RecordingRenderer};
use crate::{Context, ContextConfig, Error, ErrorAction, FontId};

pub(crate) type TestContext = Context<BoxEngine, RecordingRenderer>;
pub(crate) type ErrorLog = Rc<RefCell<Vec<Error>>>;

/// A context with the default config and one font covering `chars`, active
/// at 20px.
pub(crate) fn context(chars: &str) -> (TestContext, FontId) {
    context_with(ContextConfig::default(), chars)
}

pub(crate) fn context_with(config: ContextConfig, chars: &str) -> (TestContext, FontId) {
    let mut cx = Context::new(config, BoxEngine::default(), RecordingRenderer::default())
        .expect("recording renderer accepts the texture");
    let font = cx
        .add_font("sans", Blob::from(chars.as_bytes().to_vec()))
        .expect("non-empty font data loads");
    cx.set_font(font);
    cx.set_size(20.0);
    (cx, font)
}

/// Installs an error callback that logs every error and answers `action`.
pub(crate) fn record_errors(cx: &mut TestContext, action: ErrorAction) -> ErrorLog {
    let log = ErrorLog::default();
    let sink = log.clone();
    cx.set_error_callback(move |err| {
        sink.borrow_mut().push(err.clone());
        action
    });
    log
}
