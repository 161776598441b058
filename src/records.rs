use polars::prelude::{Schema, Field, DataType};


pub struct CancerRecord {
}


impl CancerRecord {
    pub fn raw_schema() -> Schema {
        Schema::from_iter(
            vec![
                Field::new("Patient_ID", DataType::Utf8),
                Field::new("Age", DataType::Int64),
                Field::new("Gender", DataType::Utf8),
                Field::new("Country_Region", DataType::Utf8),
                Field::new("Year", DataType::Int64),
                Field::new("Genetic_Risk", DataType::Float64),
                Field::new("Air_Pollution", DataType::Float64),
                Field::new("Alcohol_Use", DataType::Float64),
                Field::new("Smoking", DataType::Float64),
                Field::new("Obesity_Level", DataType::Float64),
                Field::new("Cancer_Type", DataType::Utf8),
                Field::new("Cancer_Stage", DataType::Utf8),
                Field::new("Treatment_Cost_USD", DataType::Float64),
                Field::new("Survival_Years", DataType::Float64),
                Field::new("Target_Severity_Score", DataType::Float64),
            ])
    }

    /* Every column the CSV must carry; the loader checks the header against this
    before handing the file to polars. */
    pub fn expected_columns() -> Vec<&'static str> {
        vec![
            "Patient_ID",
            "Age",
            "Gender",
            "Country_Region",
            "Year",
            "Genetic_Risk",
            "Air_Pollution",
            "Alcohol_Use",
            "Smoking",
            "Obesity_Level",
            "Cancer_Type",
            "Cancer_Stage",
            "Treatment_Cost_USD",
            "Survival_Years",
            "Target_Severity_Score",
        ]
    }
}
