// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Extracts a flat [`ExtractedRecord`] from a NewsML `NewsML` → `NewsItem`
//! document.

use regex::Regex;
use std::sync::OnceLock;

use mediadesk_domain::{ExtractedRecord, MediadeskError};

use super::node::XmlNode;

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}$").expect("valid regex"))
}

fn month_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2}$").expect("valid regex"))
}

/// Parses `xml_bytes` as a NewsML document and extracts one flat record.
///
/// Fails with [`MediadeskError::MalformedXml`] if the `NewsML`/`NewsItem`
/// root shape is missing, or [`MediadeskError::MissingPictureComponent`]
/// if no `NewsComponent` has `Role.FormalName == "PICTURE"`. Every other
/// field degrades to the empty string on an unexpected shape rather than
/// aborting extraction.
pub fn extract(xml_bytes: &[u8], origin: &str) -> Result<ExtractedRecord, MediadeskError> {
    let root = XmlNode::parse(xml_bytes)?;
    let news_ml = if root.name() == "NewsML" {
        &root
    } else {
        return Err(MediadeskError::MalformedXml(format!(
            "expected NewsML root, got `{}`",
            root.name()
        )));
    };
    let news_item = news_ml
        .child("NewsItem")
        .ok_or_else(|| MediadeskError::MalformedXml("missing NewsItem".to_string()))?;

    let mut record = ExtractedRecord::default();
    record.xml_path = origin.to_string();

    extract_identification(news_item, &mut record);
    extract_management(news_item, &mut record);

    let picture = find_picture_component(news_item)
        .ok_or_else(|| MediadeskError::MissingPictureComponent(origin.to_string()))?;

    extract_news_lines(picture, &mut record);
    extract_administrative_metadata(picture, &mut record);
    extract_descriptive_metadata(picture, &mut record);
    extract_rights(picture, &mut record);
    extract_image_metadata(picture, &mut record);

    if let Some(comment) = picture.child("Comment") {
        record.comment_data = comment.cdata();
    }

    let (city, year, month) = derive_provenance(origin);
    record.city = city;
    record.year = year;
    record.month = month;

    Ok(record)
}

fn extract_identification(news_item: &XmlNode, record: &mut ExtractedRecord) {
    let Some(identifier) = news_item
        .child("Identification")
        .and_then(|id| id.child("NewsIdentifier"))
    else {
        return;
    };
    record.news_item_id = identifier.child("NewsItemId").map(XmlNode::cdata).unwrap_or_default();
    record.date_id = identifier.child("DateId").map(XmlNode::cdata).unwrap_or_default();
    record.provider_id = identifier.child("ProviderId").map(XmlNode::cdata).unwrap_or_default();
}

fn extract_management(news_item: &XmlNode, record: &mut ExtractedRecord) {
    let Some(management) = news_item.child("NewsManagement") else {
        return;
    };
    record.status = management
        .child("Status")
        .and_then(|node| node.attr("FormalName"))
        .unwrap_or_default()
        .to_string();
    record.urgency = management
        .child("Urgency")
        .and_then(|node| node.attr("FormalName"))
        .unwrap_or_default()
        .to_string();
    record.creation_date = management.child("FirstCreated").map(XmlNode::cdata).unwrap_or_default();
    record.revision_date = management
        .child("ThisRevisionCreated")
        .map(XmlNode::cdata)
        .unwrap_or_default();
}

/// Recursive descent through `NewsComponent`, selecting the first node
/// whose `Role.FormalName == "PICTURE"`.
fn find_picture_component(news_item: &XmlNode) -> Option<&XmlNode> {
    news_item.find(&|node| {
        node.name() == "NewsComponent"
            && node
                .child("Role")
                .and_then(|role| role.attr("FormalName"))
                == Some("PICTURE")
    })
}

fn extract_news_lines(picture: &XmlNode, record: &mut ExtractedRecord) {
    let Some(news_lines) = picture.child("NewsLines") else {
        return;
    };
    record.headline = news_lines.child("HeadLine").map(XmlNode::cdata).unwrap_or_default();
    record.byline = news_lines.child("ByLine").map(XmlNode::cdata).unwrap_or_default();
    record.dateline = news_lines.child("DateLine").map(XmlNode::cdata).unwrap_or_default();
    record.creditline = news_lines.child("CreditLine").map(XmlNode::cdata).unwrap_or_default();
    record.slugline = news_lines.child("SlugLine").map(XmlNode::cdata).unwrap_or_default();
    record.copyright_line = news_lines
        .child("CopyrightLine")
        .map(XmlNode::cdata)
        .unwrap_or_default();

    let keywords = news_lines
        .children("KeywordLine")
        .into_iter()
        .map(XmlNode::cdata)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>();
    record.keywords = keywords.join(", ");
}

fn extract_administrative_metadata(picture: &XmlNode, record: &mut ExtractedRecord) {
    let Some(admin) = picture.child("AdministrativeMetadata") else {
        return;
    };
    record.edition = admin.property("Edition").unwrap_or_default();
    record.location = admin.property("Location").unwrap_or_default();
    record.page_number = admin.property("PageNumber").unwrap_or_default();
}

fn extract_descriptive_metadata(picture: &XmlNode, record: &mut ExtractedRecord) {
    let Some(descriptive) = picture.child("DescriptiveMetadata") else {
        return;
    };
    record.language = descriptive
        .child("Language")
        .and_then(|node| node.attr("FormalName"))
        .unwrap_or_default()
        .to_string();
    record.subject = descriptive
        .find(&|node| node.name() == "SubjectCode")
        .and_then(|subject_code| subject_code.child("Subject"))
        .and_then(|subject| subject.attr("FormalName"))
        .unwrap_or_default()
        .to_string();
    record.processed = descriptive.property("Processed").unwrap_or_default();
    record.published = descriptive.property("Published").unwrap_or_default();

    if let Some(location) = descriptive.child("Location") {
        record.country = location.property("Country").unwrap_or_default();
        record.city_meta = location.property("City").unwrap_or_default();
    }
}

fn extract_rights(picture: &XmlNode, record: &mut ExtractedRecord) {
    let Some(rights) = picture.child("RightsMetadata") else {
        return;
    };
    let usage_rights = rights.child("UsageRights");

    record.usage_type = usage_rights
        .and_then(|node| node.child("UsageType"))
        .map(XmlNode::cdata)
        .unwrap_or_default();
    record.rights_holder = usage_rights
        .and_then(|node| node.child("RightsHolder"))
        .map(XmlNode::cdata)
        .unwrap_or_default();

    if record.copyright_line.is_empty() {
        if let Some(usage_rights) = usage_rights {
            record.copyright_line = usage_rights
                .property("CopyrightNotice")
                .or_else(|| usage_rights.property("Copyright"))
                .unwrap_or_default();
        }
    }
}

fn extract_image_metadata(picture: &XmlNode, record: &mut ExtractedRecord) {
    let content_item = picture.children("ContentItem").into_iter().find(|item| {
        matches!(
            item.child("MediaType").and_then(|mt| mt.attr("FormalName")),
            Some("HIGHRES") | Some("Picture")
        )
    });
    let Some(content_item) = content_item else {
        return;
    };
    record.image_href = content_item.attr("Href").unwrap_or_default().to_string();

    if let Some(characteristics) = content_item.child("Characteristics") {
        record.image_size = characteristics
            .child("SizeInBytes")
            .map(XmlNode::cdata)
            .unwrap_or_default();
        record.image_width = characteristics.property("width").unwrap_or_default();
        record.image_height = characteristics.property("height").unwrap_or_default();
    }
}

/// For a local path, the first `^\d{4}$` segment is the year; the
/// preceding segment is the city; the following segment (if `^\d{2}$`) is
/// the month. The same heuristic applies to a remote URL's path.
fn derive_provenance(origin: &str) -> (String, String, String) {
    let segments: Vec<&str> = origin.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    let Some(year_index) = segments.iter().position(|segment| year_pattern().is_match(segment)) else {
        return (String::new(), String::new(), String::new());
    };
    let city = if year_index > 0 {
        segments[year_index - 1].to_string()
    } else {
        String::new()
    };
    let year = segments[year_index].to_string();
    let month = segments
        .get(year_index + 1)
        .filter(|segment| month_pattern().is_match(segment))
        .map(|segment| segment.to_string())
        .unwrap_or_default();
    (city, year, month)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"<NewsML>
      <NewsItem>
        <Identification>
          <NewsIdentifier>
            <NewsItemId>ABC123</NewsItemId>
            <DateId>2024-01-15</DateId>
            <ProviderId>wire.example.com</ProviderId>
          </NewsIdentifier>
        </Identification>
        <NewsManagement>
          <Status FormalName="Usable"/>
          <Urgency FormalName="3"/>
          <FirstCreated>2024-01-15T08:00:00Z</FirstCreated>
          <ThisRevisionCreated>2024-01-15T09:00:00Z</ThisRevisionCreated>
        </NewsManagement>
        <NewsComponent>
          <Role FormalName="PICTURE"/>
          <NewsLines>
            <HeadLine>A Photo</HeadLine>
            <ByLine>Jane Doe</ByLine>
            <CreditLine>Reuters</CreditLine>
            <KeywordLine>sports</KeywordLine>
            <KeywordLine>soccer</KeywordLine>
          </NewsLines>
          <AdministrativeMetadata>
            <Property FormalName="Edition">Morning</Property>
          </AdministrativeMetadata>
          <RightsMetadata>
            <UsageRights>
              <UsageType>Editorial</UsageType>
              <RightsHolder>Reuters</RightsHolder>
            </UsageRights>
          </RightsMetadata>
          <ContentItem>
            <MediaType FormalName="HIGHRES"/>
            <Href>A.jpg</Href>
            <Characteristics>
              <SizeInBytes>1234</SizeInBytes>
              <Property FormalName="width">1024</Property>
              <Property FormalName="height">768</Property>
            </Characteristics>
          </ContentItem>
        </NewsComponent>
      </NewsItem>
    </NewsML>"#;

    #[test]
    fn extracts_a_complete_minimal_document() {
        let record = extract(MINIMAL.as_bytes(), "/root/Chicago/2024/01/a.xml").unwrap();
        assert_eq!(record.news_item_id, "ABC123");
        assert_eq!(record.status, "Usable");
        assert_eq!(record.headline, "A Photo");
        assert_eq!(record.keywords, "sports, soccer");
        assert_eq!(record.edition, "Morning");
        assert_eq!(record.usage_type, "Editorial");
        assert_eq!(record.image_href, "A.jpg");
        assert_eq!(record.image_width, "1024");
        assert_eq!(record.city, "Chicago");
        assert_eq!(record.year, "2024");
        assert_eq!(record.month, "01");
    }

    #[test]
    fn rejects_document_without_newsml_root() {
        let err = extract(b"<Other/>", "a.xml").unwrap_err();
        assert!(matches!(err, MediadeskError::MalformedXml(_)));
    }

    #[test]
    fn rejects_document_without_picture_component() {
        let xml = r#"<NewsML><NewsItem><NewsComponent><Role FormalName="TEXT"/></NewsComponent></NewsItem></NewsML>"#;
        let err = extract(xml.as_bytes(), "a.xml").unwrap_err();
        assert!(matches!(err, MediadeskError::MissingPictureComponent(_)));
    }

    #[test]
    fn falls_back_to_copyright_notice_property() {
        let xml = r#"<NewsML><NewsItem><NewsComponent>
          <Role FormalName="PICTURE"/>
          <RightsMetadata><UsageRights>
            <Property FormalName="CopyrightNotice">(c) 2024 Example</Property>
          </UsageRights></RightsMetadata>
        </NewsComponent></NewsItem></NewsML>"#;
        let record = extract(xml.as_bytes(), "a.xml").unwrap();
        assert_eq!(record.copyright_line, "(c) 2024 Example");
    }

    #[test]
    fn provenance_is_empty_when_no_year_segment_present() {
        let (city, year, month) = derive_provenance("a/b/c.xml");
        assert_eq!((city.as_str(), year.as_str(), month.as_str()), ("", "", ""));
    }
}
