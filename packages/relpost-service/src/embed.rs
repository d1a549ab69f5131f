use std::{collections::HashMap, sync::Arc};

use crate::{BoxFuture, PageContext, RelatedService, render};

/// Produces markup for an embedding token or an after-content slot.
pub trait EmbedHandler
where
	Self: Send + Sync,
{
	fn render<'a>(&'a self, ctx: &'a PageContext) -> BoxFuture<'a, String>;
}

/// Token-to-handler table, filled once at startup.
#[derive(Clone, Default)]
pub struct EmbedRegistry {
	tokens: HashMap<String, Arc<dyn EmbedHandler>>,
	after_content: Vec<Arc<dyn EmbedHandler>>,
}
impl EmbedRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn for_service(service: Arc<RelatedService>) -> Self {
		let mut registry = Self::new();
		let token = service.cfg.render.embed_token.clone();

		if service.cfg.render.inject_after_content {
			registry.register_after_content(Arc::new(RelatedItemsEmbed::new(service.clone(), false)));
		}

		registry.register(token, Arc::new(RelatedItemsEmbed::new(service, true)));

		registry
	}

	pub fn register(&mut self, token: impl Into<String>, handler: Arc<dyn EmbedHandler>) {
		self.tokens.insert(token.into(), handler);
	}

	pub fn register_after_content(&mut self, handler: Arc<dyn EmbedHandler>) {
		self.after_content.push(handler);
	}

	pub fn is_registered(&self, token: &str) -> bool {
		self.tokens.contains_key(token)
	}

	/// Replaces every registered `[token]` or `[token attrs]` in `content` with its handler's
	/// output, then appends after-content handlers.
	///
	/// Unregistered tokens are left as written. `[[token]]` renders as the literal `[token]`.
	pub async fn expand(&self, content: &str, ctx: &PageContext) -> String {
		let mut out = String::with_capacity(content.len());
		let mut rest = content;

		while let Some(start) = rest.find('[') {
			out.push_str(&rest[..start]);

			let tail = &rest[start..];

			match parse_tag(tail).filter(|tag| self.is_registered(tag.token)) {
				Some(tag) if tag.escaped => {
					out.push_str(&tail[1..tag.len - 1]);

					rest = &tail[tag.len..];
				},
				Some(tag) => {
					if let Some(handler) = self.tokens.get(tag.token) {
						out.push_str(&handler.render(ctx).await);
					}

					rest = &tail[tag.len..];
				},
				None => {
					out.push('[');

					rest = &tail[1..];
				},
			}
		}

		out.push_str(rest);

		for handler in &self.after_content {
			out.push_str(&handler.render(ctx).await);
		}

		out
	}
}

pub struct RelatedItemsEmbed {
	service: Arc<RelatedService>,
	wrap: bool,
}
impl RelatedItemsEmbed {
	pub fn new(service: Arc<RelatedService>, wrap: bool) -> Self {
		Self { service, wrap }
	}
}
impl EmbedHandler for RelatedItemsEmbed {
	fn render<'a>(&'a self, ctx: &'a PageContext) -> BoxFuture<'a, String> {
		Box::pin(async move {
			let markup = self.service.render_related(ctx).await;

			if markup.is_empty() || !self.wrap {
				return markup;
			}

			format!(
				"<div class=\"{}\">{markup}</div>",
				render::escape_html(&self.service.cfg.render.wrapper_class)
			)
		})
	}
}

#[derive(Debug, PartialEq, Eq)]
struct Tag<'a> {
	token: &'a str,
	escaped: bool,
	/// Byte length of the whole tag, brackets included.
	len: usize,
}

fn parse_tag(raw: &str) -> Option<Tag<'_>> {
	let inner = raw.strip_prefix('[')?;

	if inner.starts_with('[') {
		let tag = parse_tag(inner)?;

		return inner[tag.len..]
			.starts_with(']')
			.then_some(Tag { token: tag.token, escaped: true, len: tag.len + 2 });
	}

	let token_len = inner
		.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
		.unwrap_or(inner.len());

	if token_len == 0 {
		return None;
	}

	let token = &inner[..token_len];
	let after = &inner[token_len..];

	if after.starts_with(']') {
		return Some(Tag { token, escaped: false, len: 1 + token_len + 1 });
	}
	if !after.starts_with(char::is_whitespace) {
		return None;
	}

	let close = after.find(|c: char| c == ']' || c == '[' || c == '\n')?;

	after[close..]
		.starts_with(']')
		.then_some(Tag { token, escaped: false, len: 1 + token_len + close + 1 })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_bare_and_attributed_tags() {
		assert_eq!(
			parse_tag("[related_items] tail"),
			Some(Tag { token: "related_items", escaped: false, len: 15 })
		);
		assert_eq!(
			parse_tag("[related_items count=\"3\"]"),
			Some(Tag { token: "related_items", escaped: false, len: 25 })
		);
		assert_eq!(
			parse_tag("[[related_items]]"),
			Some(Tag { token: "related_items", escaped: true, len: 17 })
		);
	}

	#[test]
	fn rejects_malformed_tags() {
		assert_eq!(parse_tag("[]"), None);
		assert_eq!(parse_tag("[related_items"), None);
		assert_eq!(parse_tag("[related_items attr"), None);
		assert_eq!(parse_tag("[related.items]"), None);
		assert_eq!(parse_tag("[[related_items]"), None);
	}
}
