//! The shared portable function vocabulary.
//!
//! [`BASE`] holds ANSI-flavoured templates. Engines replace the entries they
//! spell differently through [`DialectCapabilities::function_overrides`].
//!
//! [`DialectCapabilities::function_overrides`]: super::DialectCapabilities::function_overrides

use crate::catalog::FunctionDef;

const fn f(
    name: &'static str,
    arity: usize,
    template: &'static str,
    description: &'static str,
) -> FunctionDef {
    FunctionDef::new(name, arity, template, description)
}

pub const BASE: &[FunctionDef] = &[
    // strings
    f("AFUpper", 1, "upper(<p1>)", "Upper-case a string"),
    f("AFLower", 1, "lower(<p1>)", "Lower-case a string"),
    f("AFTrim", 1, "trim(<p1>)", "Strip leading and trailing spaces"),
    f("AFLTrim", 1, "ltrim(<p1>)", "Strip leading spaces"),
    f("AFRTrim", 1, "rtrim(<p1>)", "Strip trailing spaces"),
    f("AFLength", 1, "length(<p1>)", "Length in characters"),
    f("AFSubstring", 2, "substring(<p1> from <p2>)", "Suffix starting at a 1-based position"),
    f(
        "AFSubstring",
        3,
        "substring(<p1> from <p2> for <p3>)",
        "Substring by 1-based position and length",
    ),
    f("AFLeft", 2, "substring(<p1> from 1 for <p2>)", "Leading characters"),
    f("AFRight", 2, "right(<p1>, <p2>)", "Trailing characters"),
    f("AFConcat", 2, "<p1> || <p2>", "Concatenate strings"),
    f("AFConcat", 3, "<p1> || <p2> || <p3>", "Concatenate strings"),
    f("AFConcat", 4, "<p1> || <p2> || <p3> || <p4>", "Concatenate strings"),
    f("AFConcat", 5, "<p1> || <p2> || <p3> || <p4> || <p5>", "Concatenate strings"),
    f("AFReplace", 3, "replace(<p1>, <p2>, <p3>)", "Replace every occurrence"),
    f("AFPosition", 2, "position(<p1> in <p2>)", "1-based position of a needle, 0 if absent"),
    // nulls
    f("AFIsNull", 2, "coalesce(<p1>, <p2>)", "Fallback for a null value"),
    f("AFCoalesce", 2, "coalesce(<p1>, <p2>)", "First non-null value"),
    f("AFCoalesce", 3, "coalesce(<p1>, <p2>, <p3>)", "First non-null value"),
    f("AFCoalesce", 4, "coalesce(<p1>, <p2>, <p3>, <p4>)", "First non-null value"),
    f("AFCoalesce", 5, "coalesce(<p1>, <p2>, <p3>, <p4>, <p5>)", "First non-null value"),
    // numbers
    f("AFRound", 1, "round(<p1>)", "Round to an integer"),
    f("AFRound", 2, "round(<p1>, <p2>)", "Round to a number of decimals"),
    f("AFAbs", 1, "abs(<p1>)", "Absolute value"),
    f("AFCeiling", 1, "ceiling(<p1>)", "Smallest integer not below the value"),
    f("AFFloor", 1, "floor(<p1>)", "Largest integer not above the value"),
    f("AFMod", 2, "mod(<p1>, <p2>)", "Remainder of a division"),
    f("AFRandom", 0, "random()", "Random number"),
    // dates
    f("AFNow", 0, "current_timestamp", "Current timestamp"),
    f("AFToday", 0, "current_date", "Current date"),
    f("AFYear", 1, "extract(year from <p1>)", "Year part"),
    f("AFMonth", 1, "extract(month from <p1>)", "Month part"),
    f("AFDay", 1, "extract(day from <p1>)", "Day-of-month part"),
    f("AFHour", 1, "extract(hour from <p1>)", "Hour part"),
    f("AFMinute", 1, "extract(minute from <p1>)", "Minute part"),
    f("AFAddDays", 2, "(<p1> + <p2> * interval '1 day')", "Shift a date by days"),
    f("AFAddMonths", 2, "(<p1> + <p2> * interval '1 month')", "Shift a date by months"),
    f(
        "AFDiffDays",
        2,
        "(cast(<p2> as date) - cast(<p1> as date))",
        "Whole days from the first date to the second",
    ),
    f("AFDateOnly", 1, "cast(<p1> as date)", "Drop the time of day"),
    // conversions
    f("AFToString", 1, "cast(<p1> as varchar(255))", "Convert to text"),
    f("AFToInt", 1, "cast(<p1> as integer)", "Convert to an integer"),
    f(
        "AFToDecimal",
        3,
        "cast(<p1> as decimal(<p2>, <p3>))",
        "Convert to a decimal of given precision and scale",
    ),
    f("AFNewGuid", 0, "uuid()", "New random identifier"),
];
