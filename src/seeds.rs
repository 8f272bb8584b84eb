//! Built-in challenge table: the five shipped tools with their bug rules and
//! broken/fixed reference snippets.

use crate::domain::{BugDefinition, BugRule, Challenge, ChallengeSource, DetectionRule, Severity};

fn bug(
  id: u32,
  title: &str,
  severity: Severity,
  message: &str,
  hint: &str,
  rule: DetectionRule,
  search_terms: &[&str],
) -> BugRule {
  BugRule {
    bug: BugDefinition {
      id,
      title: title.into(),
      message: message.into(),
      hint: Some(hint.into()),
      severity,
    },
    rule,
    search_terms: search_terms.iter().map(|s| s.to_string()).collect(),
  }
}

/// Challenges that guarantee detection works without any external config.
pub fn seed_challenges() -> Vec<Challenge> {
  vec![
    Challenge {
      id: "date-calculator".into(),
      title: "Date Calculator".into(),
      source: ChallengeSource::Builtin,
      rules: vec![
        bug(
          1,
          "Missing Date Validation",
          Severity::Error,
          "No validation for empty dates",
          "Add validation: if (!startDate || !endDate) return \"Select both dates\"",
          DetectionRule::absence([
            vec!["if (!startDate || !endDate)"],
            vec!["if (!startDate"],
            vec!["if (!endDate"],
            vec!["return", "Select both dates"],
          ]),
          &["calculateDays", "calculateDateDifference", "return diffTime"],
        ),
        bug(
          2,
          "Incorrect Date Calculation",
          Severity::Error,
          "Missing Math.abs() and Math.ceil() for proper calculation",
          "Use Math.abs() and Math.ceil() for proper date calculation",
          DetectionRule::absence([vec!["Math.abs", "Math.ceil"]]),
          &["diffTime", "return"],
        ),
      ],
      broken_code: r#"const calculateDays = () => {
  const start = new Date(startDate)
  const end = new Date(endDate)
  const diffTime = end - start
  const diffDays = diffTime / (1000 * 60 * 60 * 24)
  setResult(diffDays)
}"#
      .into(),
      fixed_code: r#"const calculateDays = () => {
  if (!startDate || !endDate) {
    setResult('Select both dates')
    return
  }
  const start = new Date(startDate)
  const end = new Date(endDate)
  const diffTime = Math.abs(end - start)
  const diffDays = Math.ceil(diffTime / (1000 * 60 * 60 * 24))
  setResult(diffDays)
}"#
      .into(),
    },
    Challenge {
      id: "product-name-generator".into(),
      title: "Product Name Generator".into(),
      source: ChallengeSource::Builtin,
      rules: vec![
        bug(
          1,
          "Not Using Array Mapping",
          Severity::Error,
          "Not generating all variations using map()",
          "Use suffixes.map(suffix => keyword + suffix) to generate all variations",
          DetectionRule::absence([vec![".map("], vec!["suffixes.map"]]),
          &["generateNames", "newNames"],
        ),
        bug(
          2,
          "Limited Variety",
          Severity::Warning,
          "Names always come out in the same order",
          "Shuffle the results with Math.random() so each click feels fresh",
          DetectionRule::absence([vec!["Math.random"], vec!["Math.floor"]]),
          &["setNames"],
        ),
      ],
      broken_code: r#"const suffixes = ['ly', 'ify', 'hub', 'io', 'ster']

const generateNames = () => {
  const newNames = []
  newNames.push(keyword + suffixes[0])
  setNames(newNames)
}"#
      .into(),
      fixed_code: r#"const suffixes = ['ly', 'ify', 'hub', 'io', 'ster']

const generateNames = () => {
  const newNames = suffixes.map(suffix => keyword + suffix)
  setNames(newNames.sort(() => Math.random() - 0.5))
}"#
      .into(),
    },
    Challenge {
      id: "receipt-builder".into(),
      title: "Receipt Builder".into(),
      source: ChallengeSource::Builtin,
      rules: vec![
        bug(
          1,
          "State Mutation",
          Severity::Error,
          "Directly mutating state array",
          "Use spread operator: const updated = [...items]",
          DetectionRule::presence_without(
            ["updated[index][key] = value", "items[index][key] = value"],
            Some("[...items]"),
          ),
          &["handleChange", "[index][key]"],
        ),
        bug(
          2,
          "Incorrect Calculation",
          Severity::Warning,
          "Not converting strings to numbers",
          "Use parseFloat() and parseInt() for proper number conversion",
          DetectionRule::absence([vec!["parseFloat"], vec!["Number("]]),
          &["total", "reduce"],
        ),
        bug(
          3,
          "Missing Form Handling",
          Severity::Warning,
          "Submitting the receipt form reloads the page",
          "Handle onSubmit and call e.preventDefault()",
          DetectionRule::absence([vec!["onSubmit"], vec!["preventDefault"]]),
          &["<form"],
        ),
      ],
      broken_code: r#"const handleChange = (index, key, value) => {
  items[index][key] = value
  setItems(items)
}

const total = items.reduce((sum, item) => sum + item.price * item.qty, 0)

return (
  <form>
    <button type="submit">Print receipt</button>
  </form>
)"#
        .into(),
      fixed_code: r#"const handleChange = (index, key, value) => {
  const updated = [...items]
  updated[index] = { ...updated[index], [key]: value }
  setItems(updated)
}

const total = items.reduce((sum, item) => {
  const price = parseFloat(item.price) || 0
  const qty = parseInt(item.qty) || 0
  return sum + price * qty
}, 0)

const handleSubmit = (e) => {
  e.preventDefault()
  setPrinted(true)
}

return (
  <form onSubmit={handleSubmit}>
    <button type="submit">Print receipt</button>
  </form>
)"#
        .into(),
    },
    Challenge {
      id: "poll-maker".into(),
      title: "Poll Maker".into(),
      source: ChallengeSource::Builtin,
      rules: vec![
        bug(
          1,
          "State Mutation",
          Severity::Error,
          "Directly mutating votes object",
          "Use setVotes(prev => ({ ...prev, [option]: prev[option] + 1 }))",
          DetectionRule::presence_without(
            ["votes[option] += 1", "votes[option] = votes[option] + 1"],
            Some("...prev"),
          ),
          &["vote", "votes["],
        ),
        bug(
          2,
          "Vote Buttons Not Wired",
          Severity::Error,
          "Option buttons never call the vote handler",
          "Attach onClick={() => handleVote(option)} to each option button",
          DetectionRule::absence([vec!["onClick", "handleVote"]]),
          &["<button"],
        ),
      ],
      broken_code: r#"const vote = (option) => {
  votes[option] += 1
  setVotes(votes)
}

return options.map(option => (
  <button key={option}>{option}: {votes[option]}</button>
))"#
        .into(),
      fixed_code: r#"const handleVote = (option) => {
  setVotes(prev => ({ ...prev, [option]: prev[option] + 1 }))
}

return options.map(option => (
  <button key={option} onClick={() => handleVote(option)}>{option}: {votes[option]}</button>
))"#
        .into(),
    },
    Challenge {
      id: "bio-generator".into(),
      title: "Bio Generator".into(),
      source: ChallengeSource::Builtin,
      rules: vec![
        bug(
          1,
          "Not Actually Random",
          Severity::Error,
          "Always uses first array element instead of random selection",
          "Use Math.floor(Math.random() * array.length) for random selection",
          DetectionRule::absence([
            vec!["Math.floor(Math.random()"],
            vec!["Math.random() * names.length"],
            vec!["Math.random() * jobs.length"],
            vec!["Math.random() * hobbies.length"],
          ]),
          &["names[0]", "jobs[0]", "hobbies[0]"],
        ),
        bug(
          2,
          "Limited Variety",
          Severity::Warning,
          "Arrays have very few options",
          "Add more names, jobs, and hobbies for variety",
          DetectionRule::absence([
            vec!["Morgan"],
            vec!["Riley"],
            vec!["Quinn"],
            vec!["Doctor"],
            vec!["Writer"],
            vec!["Musician"],
          ]),
          &["const names =", "const jobs =", "const hobbies ="],
        ),
      ],
      broken_code: r#"const names = ['Alex', 'Sam', 'Jordan']
const jobs = ['Software Engineer', 'Designer', 'Teacher']
const hobbies = ['reading', 'hiking', 'cooking']

const generateBio = () => {
  const name = names[0]
  const job = jobs[0]
  const hobby = hobbies[0]
  setBio(`${name} is a ${job} who loves ${hobby}`)
}"#
        .into(),
      fixed_code: r#"const names = ['Alex', 'Sam', 'Jordan', 'Morgan', 'Riley', 'Quinn']
const jobs = ['Software Engineer', 'Designer', 'Teacher', 'Doctor', 'Writer', 'Musician']
const hobbies = ['reading', 'hiking', 'cooking', 'traveling', 'photography']

const pick = (list) => list[Math.floor(Math.random() * list.length)]

const generateBio = () => {
  const name = pick(names)
  const job = pick(jobs)
  const hobby = pick(hobbies)
  setBio(`${name} is a ${job} who loves ${hobby}`)
}"#
        .into(),
    },
  ]
}
