use crate::common::types::Timestamp;
use crate::error::{FilterError, FilterResult};
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, digit1, space1};
use nom::combinator::{map_res, opt, recognize};
use nom::multi::separated_list1;
use nom::number::complete::double;
use nom::sequence::{pair, preceded, separated_pair};
use nom::IResult;

/// One decoded line of the influx-style line protocol:
/// `measurement[,tag=value...] field=value[,field=value...] timestamp`.
///
/// Field values must be numeric; non-scalar fields are rejected. Escaping
/// is not supported.
#[derive(Clone, Debug, PartialEq)]
pub struct LineRecord {
    pub measurement: String,
    pub tags: Vec<(String, String)>,
    pub fields: Vec<(String, f64)>,
    pub timestamp: Timestamp,
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != ',' && c != '=' && !c.is_whitespace())(input)
}

fn tag_entry(input: &str) -> IResult<&str, (String, String)> {
    let (rest, (name, value)) = separated_pair(identifier, char('='), identifier)(input)?;
    Ok((rest, (name.to_string(), value.to_string())))
}

fn field_entry(input: &str) -> IResult<&str, (String, f64)> {
    let (rest, (name, value)) = separated_pair(identifier, char('='), double)(input)?;
    Ok((rest, (name.to_string(), value)))
}

fn timestamp(input: &str) -> IResult<&str, Timestamp> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<Timestamp>()
    })(input)
}

fn line_record(input: &str) -> IResult<&str, LineRecord> {
    let (input, measurement) = identifier(input)?;
    let (input, tags) = opt(preceded(
        char(','),
        separated_list1(char(','), tag_entry),
    ))(input)?;
    let (input, _) = space1(input)?;
    let (input, fields) = separated_list1(char(','), field_entry)(input)?;
    let (input, _) = space1(input)?;
    let (input, timestamp) = timestamp(input)?;
    Ok((
        input,
        LineRecord {
            measurement: measurement.to_string(),
            tags: tags.unwrap_or_default(),
            fields,
            timestamp,
        },
    ))
}

/// Decode a single protocol line. Leading and trailing whitespace is
/// ignored; anything left over after the timestamp is an error.
pub fn parse_line(line: &str) -> FilterResult<LineRecord> {
    match line_record(line.trim()) {
        Ok(("", record)) => Ok(record),
        Ok((rest, _)) => Err(FilterError::InvalidLine(format!(
            "unexpected trailing input: {rest:?}"
        ))),
        Err(err) => Err(FilterError::InvalidLine(err.to_string())),
    }
}
