//! Prompt construction for solar plan generation

use std::fmt::Write as _;

use shared::{display_parameter, GenerateProgramRequest, MonthlyWeatherSummary};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const TASKS: &str = "\
TASKS:
1. Estimate the recommended solar capacity (in kW)
2. Suggest the number of solar panels, their wattage, and required roof area (in sq.m)
3. Recommend a tilt angle for optimal solar capture at this location; it must be between 20 and 30 degrees
4. Recommend the best panel type (e.g., monocrystalline or polycrystalline)
5. Estimate monthly power generation (in kWh) and savings (in INR)
6. Estimate system cost based on panel type and capacity
7. Calculate the approximate payback period
8. Give maintenance advice based on pollution, dust and shade
9. Include extra notes (e.g., use of microinverters or special mounting if needed)
";

const SCHEMA_INSTRUCTIONS: &str = "\
CRITICAL SCHEMA INSTRUCTIONS:
- Output MUST contain ONLY the fields shown below
- All numerical fields must be raw numbers, NOT strings or descriptive text
- Estimated cost must be in INR
- Include daily peak sunlight hours (average from radiation) in calculations
- Shade duration (hours) must directly reduce estimated generation
- Consider system loss factors (dust, heat, shading, wiring)
- Monthly generation varies seasonally with radiation, rain and shading
- Panel lifetime is 25 years; inverter lifetime is 10 years
- If estimated generation exceeds 150% of consumption, reduce the system size
";

const SAMPLE_PLAN: &str = r#"{
  "recommended_capacity_kw": 3.5,
  "total_solar_panel": 10,
  "panel_rating": 350,
  "tilt_angle": 23,
  "solar_panel_type": "Monocrystalline",
  "location": "SAVARKAR COLONY VISHRAMBAG SANGLI",
  "required_area_sq_m": 20,
  "estimated_monthly_generation_kwh": 420,
  "estimated_monthly_savings_inr": 2500,
  "estimated_cost_inr": 210000,
  "payback_period_years": 5.2,
  "maintenance_advice": "Clean panels once every 2 weeks due to moderate dust levels.",
  "notes": "Partial shading detected, recommend microinverters for optimized performance."
}"#;

/// Build the consultant prompt from the user's answers and their weather record
pub fn build_prompt(
    request: &GenerateProgramRequest,
    summaries: &[MonthlyWeatherSummary],
    address: &str,
) -> String {
    let mut prompt = String::from(
        "You are a solar energy consultant generating a personalized solar panel \
         recommendation using the following data:\n\n",
    );

    let parameters = [
        ("Monthly electricity units consumed", &request.units_consumed),
        ("Shade condition on the roof", &request.shade),
        ("Local weather condition (dust/pollution)", &request.weather_condition),
        ("Snow or heavy rain months per year", &request.snow_cover),
        ("Total electrical load of the house", &request.total_ele_load),
    ];
    for (label, value) in parameters {
        let _ = writeln!(prompt, "- {}: {}", label, display_parameter(value));
    }

    let _ = writeln!(prompt, "- Complete address: {}", address);
    prompt.push_str("- Weather averages for each month of the last year:\n");
    if summaries.is_empty() {
        prompt.push_str("  (no weather data available)\n");
    }
    for summary in summaries {
        let _ = writeln!(prompt, "  {}", summary_line(summary));
    }

    prompt.push('\n');
    prompt.push_str(TASKS);
    prompt.push('\n');
    prompt.push_str(SCHEMA_INSTRUCTIONS);
    prompt.push_str("\nReturn a JSON object like this:\n");
    prompt.push_str(SAMPLE_PLAN);
    prompt.push_str("\n\nDO NOT include any other text outside of this JSON object.");
    prompt
}

fn summary_line(summary: &MonthlyWeatherSummary) -> String {
    let name = summary
        .month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown month");

    let humidity = summary
        .average_humidity
        .map(|h| format!("{}%", h))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "{}: min temperature {} C, max temperature {} C, min humidity {}, max wind speed {} km/h, radiation {} MJ/m2",
        name,
        summary.min_temperature,
        summary.max_temperature,
        humidity,
        summary.average_windspeed,
        summary.average_radiation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> GenerateProgramRequest {
        serde_json::from_value(json!({
            "units_consumed": 320,
            "shade": "  2 hours in the evening ",
            "weather_condition": "dusty",
            "snow_cover": null,
            "user_id": "user_2abc"
        }))
        .unwrap()
    }

    fn summary(month: u32, humidity: Option<f64>) -> MonthlyWeatherSummary {
        MonthlyWeatherSummary {
            month,
            min_temperature: 14.25,
            max_temperature: 31.5,
            average_humidity: humidity,
            average_windspeed: 12.1,
            average_radiation: 18.44,
        }
    }

    #[test]
    fn test_prompt_contains_parameters_and_address() {
        let prompt = build_prompt(&request(), &[summary(1, Some(41.2))], "Sangli, India");

        assert!(prompt.contains("- Monthly electricity units consumed: 320\n"));
        assert!(prompt.contains("- Shade condition on the roof: 2 hours in the evening\n"));
        assert!(prompt.contains("- Snow or heavy rain months per year: not specified\n"));
        assert!(prompt.contains("- Total electrical load of the house: not specified\n"));
        assert!(prompt.contains("- Complete address: Sangli, India\n"));
        assert!(prompt.ends_with("DO NOT include any other text outside of this JSON object."));
    }

    #[test]
    fn test_summary_lines_follow_month_order() {
        let prompt = build_prompt(
            &request(),
            &[summary(1, Some(41.2)), summary(12, None)],
            "Sangli",
        );

        let january = prompt.find("January: min temperature 14.25 C").unwrap();
        let december = prompt.find("December:").unwrap();
        assert!(january < december);
        assert!(prompt.contains("min humidity 41.2%"));
        assert!(prompt.contains("min humidity n/a"));
    }

    #[test]
    fn test_empty_weather_is_stated() {
        let prompt = build_prompt(&request(), &[], "Sangli");
        assert!(prompt.contains("(no weather data available)"));
    }

    #[test]
    fn test_sample_plan_is_valid_json() {
        let sample: serde_json::Value = serde_json::from_str(SAMPLE_PLAN).unwrap();
        assert_eq!(sample["tilt_angle"], 23);
    }
}
