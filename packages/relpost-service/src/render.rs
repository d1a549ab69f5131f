use std::fmt::Write;

use relpost_config::Render;

use crate::RelatedItem;

/// Renders the related-items grid followed by a comment listing the rendered ids.
///
/// An empty selection renders as `""`.
pub fn related_markup(items: &[RelatedItem], cfg: &Render) -> String {
	if items.is_empty() {
		return String::new();
	}

	let mut out = String::from("<div class=\"related-items-grid\">\n");

	for item in items {
		let title = escape_html(&item.title);

		out.push_str("\t<div class=\"related-item\">\n");

		let _ = writeln!(out, "\t\t<a href=\"{}\">", escape_html(&item.permalink));

		if let Some(thumbnail) = item.thumbnail_url.as_deref().filter(|url| !url.is_empty()) {
			let _ = writeln!(
				out,
				"\t\t\t<img src=\"{}\" alt=\"{title}\" class=\"related-item-thumbnail size-{}\" loading=\"lazy\">",
				escape_html(thumbnail),
				escape_html(&cfg.thumbnail_size),
			);
		}

		let _ = writeln!(out, "\t\t\t<h4>{title}</h4>");

		out.push_str("\t\t</a>\n\t</div>\n");
	}

	out.push_str("</div>\n");

	let ids = items.iter().map(|item| item.item_id.to_string()).collect::<Vec<_>>().join(", ");
	let _ = write!(out, "<!-- Related item IDs: {ids} -->");

	out
}

pub fn escape_html(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for ch in raw.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#039;"),
			_ => out.push(ch),
		}
	}

	out
}
