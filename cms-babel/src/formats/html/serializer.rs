//! HTML preview serialization (rich tree → HTML)
//!
//! Pipeline: rich tree → document AST → Markdown (shortcodes rendered with
//! their preview templates) → HTML. Going through Markdown keeps the preview
//! faithful to what the published page renders, including Markdown typed as
//! plain text into the editor.

use crate::common::{serialize, SerializeOptions};
use crate::error::FormatError;
use crate::formats::markdown::{default_comrak_options, serialize_mdast, BuildOptions};
use crate::plugins::ComponentRegistry;
use crate::rich::{Document, ShortcodeData};
use comrak::markdown_to_html;

pub(super) struct PreviewOptions<'c> {
    pub unsafe_html: bool,
    pub void_code_block: bool,
    pub components: &'c ComponentRegistry,
}

pub(super) fn serialize_to_html(doc: &Document, options: &PreviewOptions<'_>) -> Result<String, FormatError> {
    let root = serialize(
        doc,
        &SerializeOptions {
            void_code_block: options.void_code_block,
        },
    )?;
    let render = |data: &ShortcodeData| options.components.to_preview(data);
    let markdown = serialize_mdast(
        &root,
        &BuildOptions {
            bullet_char: b'-',
            render_shortcode: &render,
        },
    )?;

    let mut comrak_options = default_comrak_options();
    comrak_options.render.unsafe_ = options.unsafe_html;
    Ok(markdown_to_html(&markdown, &comrak_options))
}
