//! Layout extraction: turns document pages into positioned fragments grouped
//! into rows. Purely structural; nothing here interprets the text.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{LedgerError, Result};
use crate::models::{PositionedFragment, TransactionRow};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub fragments: Vec<PositionedFragment>,
}

/// A loaded statement, ready for row extraction.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub checksum: String,
    /// Layout family key declared by the producer of the fragments, if any.
    pub layout: Option<String>,
    pub pages: Vec<Page>,
}

/// On-disk form of a pre-extracted fragment document.
#[derive(Debug, Deserialize)]
struct FragmentFile {
    #[serde(default)]
    layout: Option<String>,
    pages: Vec<Page>,
}

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn load_document(path: &Path) -> Result<Document> {
    let data = std::fs::read(path)
        .map_err(|e| LedgerError::DocumentLoad(format!("{}: {e}", path.display())))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("statement")
        .to_string();
    load_document_bytes(&name, &data)
}

pub fn load_document_bytes(name: &str, data: &[u8]) -> Result<Document> {
    let checksum = compute_checksum(data);
    let (layout, pages) = if data.starts_with(b"%PDF") {
        (None, load_pdf_pages(data)?)
    } else {
        let file: FragmentFile = serde_json::from_slice(data)
            .map_err(|e| LedgerError::DocumentLoad(format!("{name}: {e}")))?;
        (file.layout, file.pages)
    };
    log::debug!("loaded {name}: {} page(s)", pages.len());
    Ok(Document {
        name: name.to_string(),
        checksum,
        layout,
        pages,
    })
}

#[cfg(not(feature = "pdf"))]
fn load_pdf_pages(_data: &[u8]) -> Result<Vec<Page>> {
    Err(LedgerError::DocumentLoad(
        "PDF support is not enabled in this build".to_string(),
    ))
}

#[cfg(feature = "pdf")]
fn load_pdf_pages(data: &[u8]) -> Result<Vec<Page>> {
    let doc = lopdf::Document::load_mem(data)
        .map_err(|e| LedgerError::DocumentLoad(e.to_string()))?;
    let mut pages = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let content = doc
            .get_page_content(page_id)
            .map_err(|e| LedgerError::DocumentLoad(e.to_string()))?;
        let content = lopdf::content::Content::decode(&content)
            .map_err(|e| LedgerError::DocumentLoad(e.to_string()))?;
        pages.push(Page {
            fragments: pdf::fragments_from_operations(&content.operations),
        });
    }
    Ok(pages)
}

#[cfg(feature = "pdf")]
mod pdf {
    use lopdf::content::Operation;
    use lopdf::Object;

    use crate::models::PositionedFragment;

    // Text matrix [a b c d e f]; only e/f are used as the fragment origin.
    type Matrix = [f64; 6];

    const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

    fn number(obj: &Object) -> Option<f64> {
        match obj {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r as f64),
            _ => None,
        }
    }

    fn latin1(bytes: &[u8]) -> String {
        bytes.iter().map(|&b| b as char).collect()
    }

    fn translate(m: &Matrix, tx: f64, ty: f64) -> Matrix {
        [m[0], m[1], m[2], m[3], m[0] * tx + m[2] * ty + m[4], m[1] * tx + m[3] * ty + m[5]]
    }

    fn shown_text(operands: &[Object]) -> String {
        let mut text = String::new();
        for operand in operands {
            match operand {
                Object::String(bytes, _) => text.push_str(&latin1(bytes)),
                Object::Array(items) => {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => text.push_str(&latin1(bytes)),
                            // Large negative kerning is a visual word gap.
                            other => {
                                if number(other).is_some_and(|n| n < -200.0) {
                                    text.push(' ');
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        text
    }

    pub(super) fn fragments_from_operations(operations: &[Operation]) -> Vec<PositionedFragment> {
        let mut fragments = Vec::new();
        let mut tm = IDENTITY;
        let mut tlm = IDENTITY;
        let mut leading = 0.0;

        for op in operations {
            let nums: Vec<f64> = op.operands.iter().filter_map(number).collect();
            match op.operator.as_str() {
                "BT" => {
                    tm = IDENTITY;
                    tlm = IDENTITY;
                }
                "TL" => {
                    if let Some(l) = nums.first() {
                        leading = *l;
                    }
                }
                "Td" | "TD" if nums.len() == 2 => {
                    if op.operator == "TD" {
                        leading = -nums[1];
                    }
                    tlm = translate(&tlm, nums[0], nums[1]);
                    tm = tlm;
                }
                "Tm" if nums.len() == 6 => {
                    tlm = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                    tm = tlm;
                }
                "T*" => {
                    tlm = translate(&tlm, 0.0, -leading);
                    tm = tlm;
                }
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator != "Tj" && op.operator != "TJ" {
                        tlm = translate(&tlm, 0.0, -leading);
                        tm = tlm;
                    }
                    let text = shown_text(&op.operands);
                    if !text.trim().is_empty() {
                        // PDF space grows upward; fragments grow downward.
                        fragments.push(PositionedFragment::new(text, tm[4], -tm[5]));
                    }
                }
                _ => {}
            }
        }
        fragments
    }

}

/// Group one page's fragments into rows. Fragments within `tolerance` of a
/// row's first fragment join that row; each row is ordered by x.
pub fn group_rows(page: usize, fragments: &[PositionedFragment], tolerance: f64) -> Vec<TransactionRow> {
    let mut sorted: Vec<&PositionedFragment> = fragments
        .iter()
        .filter(|f| !f.text.trim().is_empty())
        .collect();
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y));

    let mut rows: Vec<TransactionRow> = Vec::new();
    for frag in sorted {
        match rows.last_mut() {
            Some(row) if (frag.y - row.y).abs() <= tolerance => row.fragments.push(frag.clone()),
            _ => rows.push(TransactionRow {
                page,
                y: frag.y,
                fragments: vec![frag.clone()],
            }),
        }
    }
    for row in &mut rows {
        row.fragments.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    rows
}

/// All rows of a document in reading order, pages concatenated.
pub fn extract_rows(doc: &Document, tolerance: f64) -> Vec<TransactionRow> {
    let mut rows = Vec::new();
    for (index, page) in doc.pages.iter().enumerate() {
        let page_rows = group_rows(index, &page.fragments, tolerance);
        log::debug!("page {}: {} row(s)", index + 1, page_rows.len());
        rows.extend(page_rows);
    }
    rows
}
