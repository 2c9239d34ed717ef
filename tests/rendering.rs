mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use lopdf::content::Content;
use lopdf::Object;
use sales_report::model::Rgb;
use sales_report::{render_sales_report, RenderedReport, ReportSettings, SaleRecord};
use sha2::{Digest, Sha256};

fn generated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap()
}

fn settings() -> ReportSettings {
    ReportSettings::default().with_logo_path("/nonexistent/technorth.jpeg")
}

fn sample_sales(count: usize) -> Vec<SaleRecord> {
    let newest = Utc.with_ymd_and_hms(2024, 5, 31, 20, 0, 0).unwrap();
    (0..count)
        .map(|index| {
            let amount = 100.0 + index as f64;
            SaleRecord::new()
                .with_timestamp(newest - Duration::hours(index as i64))
                .with_employee_email(format!("vendedor{index}@technorth.mx"))
                .with_amounts(amount, amount * 1.16)
        })
        .collect()
}

fn render(test: &str, records: &[SaleRecord]) -> Option<RenderedReport> {
    if !common::fonts_ready(test) {
        return None;
    }
    Some(render_sales_report(records, &settings(), generated_at()).expect("render sales report"))
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            else {
                break;
            };
            let start_index = offset + start_pos + start.len();
            let Some(end_pos) = data[start_index..]
                .windows(end.len())
                .position(|window| window == end)
            else {
                break;
            };
            for byte in &mut data[start_index..start_index + end_pos] {
                if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            offset = start_index + end_pos + end.len();
        }
    }

    let mut normalized = bytes.to_vec();
    let parenthesized: [&[u8]; 3] = [b"/CreationDate(", b"/ModDate(", b"/Producer("];
    for tag in parenthesized {
        scrub_segment(&mut normalized, tag, b')');
    }
    scrub_segment(&mut normalized, b"/ID[", b']');
    let xmp_fields: [(&[u8], &[u8]); 6] = [
        (b"<xmp:CreateDate>", b"</xmp:CreateDate>"),
        (b"<xmp:ModifyDate>", b"</xmp:ModifyDate>"),
        (b"<xmp:MetadataDate>", b"</xmp:MetadataDate>"),
        (b"<xmpMM:DocumentID>", b"</xmpMM:DocumentID>"),
        (b"<xmpMM:InstanceID>", b"</xmpMM:InstanceID>"),
        (b"<xmpMM:VersionID>", b"</xmpMM:VersionID>"),
    ];
    for (start, end) in xmp_fields {
        scrub_xml(&mut normalized, start, end);
    }
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(scrub_pdf(bytes)).into()
}

fn pdf_page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes)
        .expect("parse rendered PDF")
        .get_pages()
        .len()
}

#[test]
fn empty_dataset_renders_single_page_pdf() {
    let Some(report) = render("empty_dataset_renders_single_page_pdf", &[]) else {
        return;
    };
    assert!(report.bytes.starts_with(b"%PDF"));
    assert_eq!(report.row_count, 0);
    assert_eq!(report.grand_total, 0.0);
    assert_eq!(pdf_page_count(&report.bytes), 1);
}

#[test]
fn long_dataset_spans_several_pages() {
    let records = sample_sales(150);
    let Some(report) = render("long_dataset_spans_several_pages", &records) else {
        return;
    };
    assert_eq!(report.row_count, 150);
    assert!(report.page_count > 1);
    assert_eq!(pdf_page_count(&report.bytes), report.page_count);

    let expected: f64 = records.iter().map(SaleRecord::total_or_zero).sum();
    assert!((report.grand_total - expected).abs() < 1e-6);
}

#[test]
fn rendering_is_deterministic() {
    let records = sample_sales(60);
    let test = "rendering_is_deterministic";
    let (Some(first), Some(second)) = (render(test, &records), render(test, &records)) else {
        return;
    };

    assert_eq!(first.bytes.len(), second.bytes.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&first.bytes),
        normalized_hash(&second.bytes),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn header_band_is_painted_as_solid_fill() {
    let Some(report) = render("header_band_is_painted_as_solid_fill", &sample_sales(3)) else {
        return;
    };
    let document = lopdf::Document::load_mem(&report.bytes).expect("parse rendered PDF");

    let first_page = *document.get_pages().values().next().expect("first page");
    let content = document
        .get_page_content(first_page)
        .expect("first page content");
    let operations = Content::decode(&content).expect("decode content stream").operations;
    assert!(
        operations.iter().any(|operation| operation.operator == "Do"),
        "first page should paint the header band"
    );

    let Rgb(red, green, blue) = Rgb::HEADER_FILL;
    let band_found = document.objects.values().any(|object| {
        let Object::Stream(stream) = object else {
            return false;
        };
        let is_image = stream
            .dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map_or(false, |name| name == b"Image");
        let dimension = |key: &[u8]| stream.dict.get(key).and_then(Object::as_i64).ok();
        let pixels = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        is_image
            && dimension(b"Width") == Some(1)
            && dimension(b"Height") == Some(1)
            && pixels == [red, green, blue]
    });
    assert!(band_found, "no 1x1 image carries the header fill color");
}
