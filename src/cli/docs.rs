//! Documentation content for the qql CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Functions,
    Quantifiers,
    Types,
    Macros,
    Queries,
    Sorting,
}

impl DocCategory {
    /// Parse category name from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "functions" | "function" | "builtins" => Some(Self::Functions),
            "quantifiers" | "quantifier" | "exists" | "forall" => Some(Self::Quantifiers),
            "types" | "type" | "durations" => Some(Self::Types),
            "macros" | "macro" | "config" => Some(Self::Macros),
            "queries" | "query" | "ranges" | "search" => Some(Self::Queries),
            "sorting" | "sort" => Some(Self::Sorting),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"QQL DOCUMENTATION

QQL selects tasks from a todo.txt list with logical formulas over task
attributes. A query is tested against every task; the task under test is
`it`, the whole list is `items` and the current date is `today`.

DOCUMENTATION CATEGORIES

  syntax            Literals, names, calls, shorthands, grouping
  operators         Logical, comparison and arithmetic operators; precedence
  functions         Built-in functions and implicit items
  quantifiers       exists / forall over items, projects, tags
  types             Value types, durations and dates
  macros            Defining your own functions in a config file
  queries           Ranges, word search and how queries are recognised
  sorting           Ordering results with --sort

QUICK REFERENCE

  !done                         Open tasks
  +garden && @phone             Project and context shorthands
  priority >= prio("B")         Priority B or higher
  tagDate("due") <= today + 1w  Due within a week
  exists i in items: ...        Quantifier

Run 'qql docs <category>' for detailed documentation.
Run 'qql functions' for the signatures of all available functions.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::parse(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Functions) => Ok(FUNCTIONS_DOC),
        Some(DocCategory::Quantifiers) => Ok(QUANTIFIERS_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        Some(DocCategory::Macros) => Ok(MACROS_DOC),
        Some(DocCategory::Queries) => Ok(QUERIES_DOC),
        Some(DocCategory::Sorting) => Ok(SORTING_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX

LITERALS
  true, false                   Booleans
  42                            Integers
  "text", "say \"hi\""          Strings; backslash escapes the next character,
                                \n and \t are newline and tab
  3d, 2w, 1m, 1y                Durations (also day/days, week/weeks,
                                month/months, year/years)

NAMES
  it, items, today              Free variables of every query
  done, description, ...        Function names; parentheses are optional
                                when there are no arguments

CALLS
  tag(it, "due")
  tag("due")                    The item argument may be omitted
  tag("due", "none")            Optional trailing argument

SHORTHANDS
  +garden                       Has a project +garden or +garden.<sub>
  @phone                        Has a context @phone or @phone.<sub>

GROUPING
  ( ... ) and { ... } are interchangeable.

EMPTY QUERY
  An empty query matches every task.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS

LOGICAL
  a && b, a and b               Both
  a || b, a or b                Either
  a -> b, a impl b              Implication (!a || b), right-associative
  !a                            Negation

  && and || evaluate left to right and stop as soon as the result is known.

COMPARISON
  ==  <  <=  >  >=              Operands must have the same type.
                                Ordering works on int, string, date and
                                duration; == also works on bool.

  Comparisons chain from the left: a == b == c is (a == b) == c.

ARITHMETIC
  int + int, int - int          Integer arithmetic
  date + duration               Calendar-aware date shift
  date - duration
  duration + duration
  -x                            Negates an int or a duration

PRECEDENCE (loosest first)
  exists / forall
  ->
  ||
  &&
  !
  == < <= > >=
  + -
  unary + -

  Note that ! binds looser than comparison: !a == b means !(a == b).
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS

ITEM ATTRIBUTES (item argument optional)
  done                          Completed?
  description                   Text after priority and dates
  projects, contexts            All +projects / @contexts
  tags("key")                   All values of key:value tags
  tag("key"[, default])         First value, default ""
  hasTag("key")                 Has at least one such tag
  priority                      A=26 ... Z=1, none=0
  position([collection])        1-based position, 0 if absent
  created([default])            Creation date, default today
  completed([default])          Completion date, default today
  tagDate("key"[, default])     Tag value parsed as YYYY-MM-DD, default today

OTHER
  prio("B")                     Priority letter as a number
  date(2024, 5, 1)              Date from year, month, day (clamped)
  days(2w)                      Whole days in a duration
  dotPrefix(name, prefix)       name is prefix or prefix.<something>
  contains(strings, "x")        Membership
  hasSubstring(text, "x")       Case-insensitive substring
  lower(text)                   Lowercase
  count(items)                  Number of items

IMPLICIT ITEMS
  When the item argument is left out, the task under test (it) is used:
  done, done() and done(it) are the same.

Run 'qql functions' to list every function with its signature, including
macros from your config file.
"#;

const QUANTIFIERS_DOC: &str = r#"QUANTIFIERS

  exists <var> in <collection>: <condition>
  forall <var> in <collection>: <condition>

  <collection> is an item collection (items) or a string collection
  (projects, contexts, tags("key")). The variable is bound only inside the
  condition, which extends as far right as possible; use parentheses to end
  it early.

EXAMPLES
  exists i in items: tag(i, "id") == tag("after") && !done(i)
  forall p in projects: dotPrefix(p, "+work")
  (exists c in contexts: c == "@home") && !done

EMPTY COLLECTIONS
  exists is false and forall is true over an empty collection.
"#;

const TYPES_DOC: &str = r#"TYPES

  bool, int, string, date, duration, item,
  item_collection, string_collection

  Queries are checked before they run: a query must be a bool, and every
  operator and function must receive the types it expects. `true && "true"`
  is rejected when compiled, not when run.

DURATIONS
  A duration is a number of months plus a number of days. Adding one to a
  date shifts the months first (clamping to the end of the month) and then
  the days. For comparison a month counts as 365/12 days, so 1y == 365d
  and 1m > 30d.

DATES
  today                         The current date (UTC)
  created, completed, tagDate   Dates read from the task
  date(y, m, d)                 Constructed dates
"#;

const MACROS_DOC: &str = r#"MACROS

Macros are functions written in QQL, declared in a JSON config file passed
with -c/--config:

  {
    "macros": [
      {
        "name": "blocked",
        "query": "exists a in tags(arg0, \"after\"): exists i in items: contains(tags(i, \"id\"), a) && !done(i)",
        "args": ["item"],
        "result": "bool",
        "inject_it": true
      }
    ]
  }

  name        Function name; redefining a built-in replaces it
  query       Body; arguments are arg0, arg1, ...
  args        Argument types (default: none)
  result      Result type (default: bool)
  inject_it   Allow callers to omit an item argument (default: false)

Macros are registered in order, so a macro may call the ones above it.

  qql filter todo.txt -q '!done && !blocked'
"#;

const QUERIES_DOC: &str = r#"QUERIES

qql filter accepts several kinds of query; all given filters must match.

  -q, --qql <QUERY>             QQL formula
  -r, --range <RANGES>          Positions: 3  2-5  -4  8-  (comma-separated)
  -s, --search <WORDS>          Case-insensitive search in descriptions
  -Q, --query <TEXT>            Any of the above: tried as QQL, then as a
                                range, then as a word search

EXAMPLES
  qql filter todo.txt -q '!done && +garden'
  qql filter todo.txt -r '-4,8-'
  qql filter todo.txt -Q milk
"#;

const SORTING_DOC: &str = r#"SORTING

  --sort '<key> [asc|desc], ...'

  Each key is a QQL expression of type bool, int, string, date or
  duration. Items are compared by the first key, ties by the next, and
  remaining ties keep their list order.

EXAMPLES
  --sort 'priority desc'
  --sort 'tagDate("due", date(9999, 12, 31)), priority desc'
  --sort 'done, description'
"#;
