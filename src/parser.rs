use crate::error::{FilterError, Result};
use crate::vectorize::{FeatureMatrix, FeatureVector};
use crate::{Graph, NodeId};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1},
    character::complete::{digit1, one_of, space0, space1},
    combinator::{all_consuming, map, map_res, rest},
    multi::separated_list1,
    sequence::{preceded, separated_pair, terminated, tuple},
    IResult,
};
use std::path::Path;

/// One line of the transaction graph format
#[derive(Debug, Clone, PartialEq, Eq)]
enum RecordLine<'a> {
    Header(&'a str),
    Vertex(NodeId, &'a str),
    Edge(NodeId, NodeId, &'a str),
}

/// Parse a single unsigned integer
fn parse_usize(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |s: &str| s.parse::<usize>())(input)
}

/// A label is any run of non-whitespace characters
fn parse_label(input: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(input)
}

/// `t # <id>` or `#<id>`
fn parse_header(input: &str) -> IResult<&str, RecordLine<'_>> {
    map(preceded(alt((tag("t #"), tag("#"))), rest), |id: &str| {
        RecordLine::Header(id.trim())
    })(input)
}

/// `v <id> <label>`
fn parse_vertex(input: &str) -> IResult<&str, RecordLine<'_>> {
    map(
        tuple((tag("v"), space1, parse_usize, space1, parse_label)),
        |(_, _, id, _, label)| RecordLine::Vertex(id, label),
    )(input)
}

/// `e <u> <v> <label>`, or `u <u> <v> <label>` in the FSG dialect
fn parse_edge(input: &str) -> IResult<&str, RecordLine<'_>> {
    map(
        tuple((
            alt((tag("e"), tag("u"))),
            space1,
            parse_usize,
            space1,
            parse_usize,
            space1,
            parse_label,
        )),
        |(_, _, u, _, v, _, label)| RecordLine::Edge(u, v, label),
    )(input)
}

fn parse_record_line(input: &str) -> IResult<&str, RecordLine<'_>> {
    all_consuming(terminated(
        alt((parse_header, parse_vertex, parse_edge)),
        space0,
    ))(input)
}

/// Parse a transaction file holding any number of labeled graphs.
///
/// Any line that is not a header, vertex or edge record fails the whole
/// parse; no bytes are skipped silently.
pub fn parse_graphs(input: &str) -> Result<Vec<Graph>> {
    let mut graphs = Vec::new();
    let mut current: Option<Graph> = None;
    let mut record = String::from("<none>");

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let (_, parsed) = parse_record_line(line)
            .map_err(|e| FilterError::malformed(line_no, &record, format!("{e}: {line:?}")))?;

        match parsed {
            RecordLine::Header(id) => {
                if let Some(done) = current.take() {
                    graphs.push(done);
                }
                record = id.to_string();
                current = Some(Graph::new(id));
            }
            RecordLine::Vertex(id, label) => {
                let graph = current
                    .as_mut()
                    .ok_or_else(|| FilterError::malformed(line_no, &record, "vertex before header"))?;
                if !graph.add_node(id, label) {
                    return Err(FilterError::malformed(
                        line_no,
                        &record,
                        format!("duplicate node id {id}"),
                    ));
                }
            }
            RecordLine::Edge(u, v, label) => {
                let graph = current
                    .as_mut()
                    .ok_or_else(|| FilterError::malformed(line_no, &record, "edge before header"))?;
                if !graph.add_edge(u, v, label) {
                    return Err(FilterError::malformed(
                        line_no,
                        &record,
                        format!("edge ({u}, {v}) references an unknown node"),
                    ));
                }
            }
        }
    }

    if let Some(done) = current {
        graphs.push(done);
    }
    Ok(graphs)
}

/// Parse input file containing a graph corpus
pub fn parse_graph_file(path: &Path) -> Result<Vec<Graph>> {
    let content = std::fs::read_to_string(path)?;
    parse_graphs(&content)
}

/// Parse the `<rows> <cols>` header line
fn parse_matrix_header(input: &str) -> IResult<&str, (usize, usize)> {
    all_consuming(terminated(
        preceded(space0, separated_pair(parse_usize, space1, parse_usize)),
        space0,
    ))(input)
}

/// Parse a row of space-separated 0/1 cells
fn parse_bit_row(input: &str) -> IResult<&str, Vec<bool>> {
    all_consuming(terminated(
        preceded(
            space0,
            separated_list1(space1, map(one_of("01"), |c| c == '1')),
        ),
        space0,
    ))(input)
}

/// Parse a dense binary feature matrix: a `<rows> <cols>` header followed by `rows` rows
pub fn parse_feature_matrix(input: &str) -> Result<FeatureMatrix> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_no, header) = lines
        .next()
        .ok_or_else(|| FilterError::malformed_matrix(1, "missing header"))?;
    let (_, (rows, width)) = parse_matrix_header(header)
        .map_err(|e| FilterError::malformed_matrix(header_no, format!("bad header: {e}")))?;

    // every schema has at least the degree-0 bucket
    if width == 0 {
        return Err(FilterError::malformed_matrix(header_no, "matrix has no columns"));
    }

    let mut matrix = FeatureMatrix::new(width);
    for (line_no, line) in lines {
        if matrix.len() == rows {
            return Err(FilterError::malformed_matrix(
                line_no,
                format!("more than {rows} rows"),
            ));
        }
        let (_, bits) = parse_bit_row(line)
            .map_err(|e| FilterError::malformed_matrix(line_no, format!("bad row: {e}")))?;
        if bits.len() != width {
            return Err(FilterError::malformed_matrix(
                line_no,
                format!("row has {} cells, expected {width}", bits.len()),
            ));
        }
        matrix.push(FeatureVector::from_bits(&bits));
    }

    if matrix.len() != rows {
        return Err(FilterError::malformed_matrix(
            header_no,
            format!("header declares {rows} rows, found {}", matrix.len()),
        ));
    }
    Ok(matrix)
}

/// Parse a feature matrix file
pub fn parse_matrix_file(path: &Path) -> Result<FeatureMatrix> {
    let content = std::fs::read_to_string(path)?;
    parse_feature_matrix(&content)
}
