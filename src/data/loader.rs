//! Table loading (CSV or Parquet) for interactions and character metadata

use crate::data::preprocessing::RawEdge;
use crate::graph::NodeRecord;
use anyhow::{anyhow, Result};
use polars::prelude::*;
use std::path::Path;

/// Read a whole table; `.parquet` files go through the Parquet reader, anything else is CSV
pub fn read_table(path: &str) -> Result<DataFrame> {
    if !Path::new(path).exists() {
        return Err(anyhow!("File not found: {}", path));
    }

    let is_parquet = Path::new(path)
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("parquet"));

    let df = if is_parquet {
        log::info!("Reading parquet file: {}", path);
        LazyFrame::scan_parquet(path, Default::default())?.collect()?
    } else {
        log::info!("Reading CSV file: {}", path);
        // Every column is read as text; numeric columns are cast by the callers
        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?
    };

    log::debug!("File schema: {:?}", df.schema());
    Ok(df)
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Column values as optional strings
fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.str()?;
    Ok(values.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Load interaction rows. `source` and `target` are required; a missing
/// `weight` column means every interaction weighs 1.
pub fn load_interactions(path: &str) -> Result<Vec<RawEdge>> {
    let df = read_table(path)?;

    for required in ["source", "target"] {
        if !has_column(&df, required) {
            return Err(anyhow!("{} must contain columns: source,target[,weight]", path));
        }
    }

    let sources = string_values(&df, "source")?;
    let targets = string_values(&df, "target")?;

    let (weights, weight_texts) = if has_column(&df, "weight") {
        let numeric = df.column("weight")?.cast(&DataType::Float64)?;
        let weights: Vec<Option<f64>> = numeric.f64()?.into_iter().collect();
        (weights, string_values(&df, "weight")?)
    } else {
        log::info!("No weight column in {}, using weight 1 for every interaction", path);
        (vec![Some(1.0); df.height()], vec![Some("1".to_string()); df.height()])
    };

    let rows: Vec<RawEdge> = sources
        .into_iter()
        .zip(targets)
        .zip(weights.into_iter().zip(weight_texts))
        .enumerate()
        .map(|(i, ((source, target), (weight, weight_text)))| RawEdge {
            row: i + 1,
            source,
            target,
            weight,
            weight_text,
        })
        .collect();

    log::info!("Loaded {} interaction records", rows.len());
    Ok(rows)
}

/// Load character metadata. The id column is `id` or `name`; `faction` is
/// optional and every other column is kept as an extra attribute.
pub fn load_characters(path: &str) -> Result<Vec<NodeRecord>> {
    let df = read_table(path)?;

    let id_column = ["id", "name"]
        .into_iter()
        .find(|c| has_column(&df, c))
        .ok_or_else(|| anyhow!("{} must contain an 'id' or 'name' column", path))?;

    let ids = string_values(&df, id_column)?;
    let factions = if has_column(&df, "faction") {
        string_values(&df, "faction")?
    } else {
        vec![None; df.height()]
    };

    let extra_columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|c| c.to_string())
        .filter(|c| c != id_column && c != "faction")
        .collect();
    let extra_values = extra_columns
        .iter()
        .map(|c| string_values(&df, c))
        .collect::<Result<Vec<_>>>()?;

    let mut records = Vec::with_capacity(df.height());
    for (row, (id, faction)) in ids.into_iter().zip(factions).enumerate() {
        // Rows without an id carry no usable metadata
        let Some(id) = id.filter(|v| !v.trim().is_empty()) else {
            log::warn!("Skipping character row {} without an id", row + 1);
            continue;
        };

        let mut record = NodeRecord::new(id.trim());
        record.faction = faction.filter(|f| !f.trim().is_empty());
        for (name, values) in extra_columns.iter().zip(&extra_values) {
            if let Some(value) = &values[row] {
                record.extra.insert(name.clone(), value.clone());
            }
        }
        records.push(record);
    }

    log::info!("Loaded {} character records from {}", records.len(), path);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::validate_records;
    use crate::error::CpmError;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn loads_weighted_interactions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "edges.csv", "source,target,weight\nA,B,5\nB,C,2.5\n");
        let rows = load_interactions(&path).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].source.as_deref(), Some("A"));
        assert_eq!(rows[1].weight, Some(2.5));
    }

    #[test]
    fn missing_weight_column_defaults_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "edges.csv", "source,target\nA,B\n");
        let rows = load_interactions(&path).unwrap();
        assert_eq!(rows[0].weight, Some(1.0));
    }

    #[test]
    fn non_numeric_weight_becomes_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "edges.csv", "source,target,weight\nA,B,3\nB,C,many\n");
        let rows = load_interactions(&path).unwrap();
        assert_eq!(rows[0].weight, Some(3.0));
        assert_eq!(rows[1].weight, None);
        assert_eq!(rows[1].weight_text.as_deref(), Some("many"));
    }

    fn late_row_table(last: &str) -> String {
        let mut contents = String::from("source,target,weight\n");
        for i in 0..150 {
            contents.push_str(&format!("a{i},b{i},3\n"));
        }
        contents.push_str(last);
        contents
    }

    #[test]
    fn late_fractional_weight_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "edges.csv", &late_row_table("x,y,2.5\n"));
        let rows = load_interactions(&path).unwrap();

        assert_eq!(rows.len(), 151);
        assert_eq!(rows[0].weight, Some(3.0));
        assert_eq!(rows[150].weight, Some(2.5));
        assert_eq!(validate_records(&rows).unwrap().len(), 151);
    }

    #[test]
    fn late_non_numeric_weight_is_a_malformed_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "edges.csv", &late_row_table("x,y,many\n"));
        let rows = load_interactions(&path).unwrap();

        let err = validate_records(&rows).unwrap_err();
        assert!(matches!(err, CpmError::MalformedEdge { row: 151, .. }), "{err:?}");
    }

    #[test]
    fn numeric_ids_followed_by_names_stay_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut contents = String::from("id,faction\n");
        for i in 0..150 {
            contents.push_str(&format!("{i},Chola\n"));
        }
        contents.push_str("Vandiyathevan,Vaanar\n");
        let path = write_csv(&dir, "characters.csv", &contents);
        let records = load_characters(&path).unwrap();

        assert_eq!(records.len(), 151);
        assert_eq!(records[0].id, "0");
        assert_eq!(records[150].id, "Vandiyathevan");
    }

    #[test]
    fn rejects_table_without_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "edges.csv", "from,to\nA,B\n");
        assert!(load_interactions(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_interactions("/nonexistent/interactions.csv").is_err());
    }

    #[test]
    fn loads_characters_with_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "characters.csv",
            "name,faction,title\nArulmozhi,Chola,Prince\nNandini,Pandya,Queen\n",
        );
        let records = load_characters(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "Arulmozhi");
        assert_eq!(records[0].faction.as_deref(), Some("Chola"));
        assert_eq!(records[1].extra.get("title").map(String::as_str), Some("Queen"));
    }
}
