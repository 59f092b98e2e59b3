// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The flat, 37-field record that ultimately becomes one CSV row.

use serde::{Deserialize, Serialize};

/// The exact CSV column order. Both the sink's header row and
/// [`ExtractedRecord::to_csv_fields`] must agree with this list.
pub const CSV_COLUMNS: [&str; 37] = [
    "city",
    "year",
    "month",
    "newsItemId",
    "dateId",
    "providerId",
    "headline",
    "byline",
    "dateline",
    "creditline",
    "copyrightLine",
    "slugline",
    "keywords",
    "edition",
    "location",
    "country",
    "city_meta",
    "pageNumber",
    "status",
    "urgency",
    "language",
    "subject",
    "processed",
    "published",
    "usageType",
    "rightsHolder",
    "imageWidth",
    "imageHeight",
    "imageSize",
    "actualFileSize",
    "imageHref",
    "xmlPath",
    "imagePath",
    "imageExists",
    "creationDate",
    "revisionDate",
    "commentData",
];

/// A single extracted news item, ready to be filtered and, if accepted,
/// serialized as one CSV row in [`CSV_COLUMNS`] order.
///
/// All text fields are trimmed at extraction time; missing values are the
/// empty string rather than absent. `actual_file_size` is the byte count
/// measured on disk (or via a remote HEAD); `image_size` is the raw,
/// un-parsed string declared in the XML (it may carry thousands
/// separators and must not be reinterpreted as a number).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub city: String,
    pub year: String,
    pub month: String,
    pub news_item_id: String,
    pub date_id: String,
    pub provider_id: String,
    pub headline: String,
    pub byline: String,
    pub dateline: String,
    pub creditline: String,
    pub copyright_line: String,
    pub slugline: String,
    pub keywords: String,
    pub edition: String,
    pub location: String,
    pub country: String,
    pub city_meta: String,
    pub page_number: String,
    pub status: String,
    pub urgency: String,
    pub language: String,
    pub subject: String,
    pub processed: String,
    pub published: String,
    pub usage_type: String,
    pub rights_holder: String,
    pub image_width: String,
    pub image_height: String,
    /// Raw XML-declared size string, preserved verbatim.
    pub image_size: String,
    /// Measured byte count of the resolved image file, if resolved.
    pub actual_file_size: u64,
    pub image_href: String,
    pub xml_path: String,
    pub image_path: String,
    /// `"Yes"` or `"No"`.
    pub image_exists: String,
    pub creation_date: String,
    pub revision_date: String,
    pub comment_data: String,
}

impl ExtractedRecord {
    /// Renders this record as 37 string fields, in `CSV_COLUMNS` order,
    /// ready for CSV-escaping and serialization.
    pub fn to_csv_fields(&self) -> [String; 37] {
        [
            self.city.clone(),
            self.year.clone(),
            self.month.clone(),
            self.news_item_id.clone(),
            self.date_id.clone(),
            self.provider_id.clone(),
            self.headline.clone(),
            self.byline.clone(),
            self.dateline.clone(),
            self.creditline.clone(),
            self.copyright_line.clone(),
            self.slugline.clone(),
            self.keywords.clone(),
            self.edition.clone(),
            self.location.clone(),
            self.country.clone(),
            self.city_meta.clone(),
            self.page_number.clone(),
            self.status.clone(),
            self.urgency.clone(),
            self.language.clone(),
            self.subject.clone(),
            self.processed.clone(),
            self.published.clone(),
            self.usage_type.clone(),
            self.rights_holder.clone(),
            self.image_width.clone(),
            self.image_height.clone(),
            self.image_size.clone(),
            self.actual_file_size.to_string(),
            self.image_href.clone(),
            self.xml_path.clone(),
            self.image_path.clone(),
            self.image_exists.clone(),
            self.creation_date.clone(),
            self.revision_date.clone(),
            self.comment_data.clone(),
        ]
    }

    /// Whether the resolved image was found (`imageExists == "Yes"`).
    pub fn has_image(&self) -> bool {
        self.image_exists == "Yes"
    }
}
