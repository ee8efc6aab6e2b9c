use crate::screenshot::Thumbnail;
use serde::Serialize;

/// Where `<img src>` points when the list is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSource {
    /// Sibling `<id>.png` file written next to the page.
    #[default]
    File,
    /// PNG embedded as a base64 data URI.
    Inline,
}

/// One `<li>` of the gallery list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailItem {
    pub id: String,
    pub image: Thumbnail,
    pub width: u32,
    pub border: Option<String>,
}

impl ThumbnailItem {
    /// Relative image path used when the list is written next to its thumbnails.
    pub fn image_file_name(&self) -> String {
        format!("{}.png", self.id)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ThumbnailItemSummary {
    pub id: String,
    pub width: u32,
    pub image_width: u32,
    pub image_height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
}

/// Headless stand-in for the gallery `<ul>` element.
#[derive(Debug, Clone)]
pub struct ImageList {
    id: String,
    items: Vec<ThumbnailItem>,
}

impl ImageList {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), items: Vec::new() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ThumbnailItem] {
        &self.items
    }

    pub fn append(&mut self, id: impl Into<String>, image: Thumbnail, width: u32) -> &ThumbnailItem {
        self.items.push(ThumbnailItem { id: id.into(), image, width, border: None });
        let last = self.items.len() - 1;
        &self.items[last]
    }

    pub fn item(&self, id: &str) -> Option<&ThumbnailItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn set_border(&mut self, id: &str, border: Option<String>) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.border = border;
                true
            }
            None => false,
        }
    }

    pub fn summaries(&self) -> Vec<ThumbnailItemSummary> {
        self.items
            .iter()
            .map(|item| ThumbnailItemSummary {
                id: item.id.clone(),
                width: item.width,
                image_width: item.image.width,
                image_height: item.image.height,
                border: item.border.clone(),
            })
            .collect()
    }

    pub fn to_html(&self) -> String {
        self.to_html_with(ImageSource::File)
    }

    pub fn to_html_with(&self, source: ImageSource) -> String {
        let mut html = format!("<ul id=\"{}\">\n", escape_attr(&self.id));
        for item in &self.items {
            let style = item
                .border
                .as_ref()
                .map(|border| format!(" style=\"border: {}\"", escape_attr(border)))
                .unwrap_or_default();
            html.push_str(&format!(
                "  <li id=\"{}\"{}><img src=\"{}\" width=\"{}\"></li>\n",
                escape_attr(&item.id),
                style,
                match source {
                    ImageSource::File => escape_attr(&item.image_file_name()),
                    ImageSource::Inline => item.image.to_data_uri(),
                },
                item.width
            ));
        }
        html.push_str("</ul>\n");
        html
    }
}

fn escape_attr(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            '&' => "&amp;".to_string(),
            '"' => "&quot;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            other => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thumb() -> Thumbnail {
        Thumbnail { width: 4, height: 4, png: vec![0x89, b'P', b'N', b'G'] }
    }

    #[test]
    fn html_lists_items_with_ids_and_borders() {
        let mut list = ImageList::new("imagelist");
        list.append("0", thumb(), 100);
        list.append("1", thumb(), 100);
        assert!(list.set_border("1", Some("2px solid red".to_string())));
        let html = list.to_html();
        assert!(html.starts_with("<ul id=\"imagelist\">"));
        assert!(html.contains("<li id=\"0\"><img src=\"0.png\" width=\"100\"></li>"));
        assert!(html.contains("<li id=\"1\" style=\"border: 2px solid red\">"));
    }

    #[test]
    fn inline_source_embeds_png_bytes() {
        let mut list = ImageList::new("imagelist");
        list.append("0", thumb(), 100);
        let html = list.to_html_with(ImageSource::Inline);
        assert!(html.contains("<img src=\"data:image/png;base64,iVBORw==\" width=\"100\">"));
        assert!(!html.contains("0.png"));
    }

    #[test]
    fn border_on_unknown_item_is_reported() {
        let mut list = ImageList::new("imagelist");
        assert!(!list.set_border("7", None));
    }

    #[test]
    fn attribute_values_are_escaped() {
        assert_eq!(escape_attr("a\"<b>&"), "a&quot;&lt;b&gt;&amp;");
    }
}
