//! Reference accuracy figures for the prediction models.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionModel {
    RandomForest,
    LightGbm,
    Lstm,
    Rnn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelMetrics {
    pub mae: Option<f64>,
    pub r2_percent: Option<f64>,
    pub mape_percent: Option<f64>,
}

pub const ALL_MODELS: [PredictionModel; 4] = [
    PredictionModel::RandomForest,
    PredictionModel::LightGbm,
    PredictionModel::Lstm,
    PredictionModel::Rnn,
];

impl PredictionModel {
    /// Accepts the service's short code or the display name.
    pub fn lookup(name: &str) -> Option<Self> {
        let name = name.trim();
        ALL_MODELS.into_iter().find(|model| {
            model.code().eq_ignore_ascii_case(name) || model.display_name().eq_ignore_ascii_case(name)
        })
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::RandomForest => "RFR",
            Self::LightGbm => "LGBM",
            Self::Lstm => "LSTM",
            Self::Rnn => "RNN",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::RandomForest => "Random Forest Regressor",
            Self::LightGbm => "LightGBM",
            Self::Lstm => "LSTM",
            Self::Rnn => "Recurrent Neural Network",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::RandomForest => "Random Forest Regressor is an ensemble learning method used for regression tasks. It works by constructing multiple decision trees and outputs the average prediction of all trees.",
            Self::LightGbm => "LightGBM (Light Gradient Boosting Machine) is a highly efficient gradient boosting framework that is used for classification and regression tasks.",
            Self::Lstm => "Long Short-Term Memory (LSTM) is a type of Recurrent Neural Network (RNN) that is well-suited for sequential data and time-series prediction tasks.",
            Self::Rnn => "Recurrent Neural Networks (RNN) are a class of neural networks that are well-suited for sequence prediction tasks by maintaining hidden states across time steps.",
        }
    }

    pub fn metrics(self) -> ModelMetrics {
        match self {
            Self::RandomForest => ModelMetrics {
                mae: Some(0.003532578888813489),
                r2_percent: Some(99.82),
                mape_percent: Some(0.63),
            },
            Self::LightGbm => ModelMetrics {
                mae: Some(0.48604242590063407),
                r2_percent: Some(98.95),
                mape_percent: Some(1.68),
            },
            Self::Lstm => ModelMetrics {
                mae: Some(0.0007495733083576547),
                r2_percent: Some(100.0),
                mape_percent: Some(0.03),
            },
            Self::Rnn => ModelMetrics {
                mae: None,
                r2_percent: None,
                mape_percent: None,
            },
        }
    }
}

impl ModelMetrics {
    pub fn mae_text(&self) -> String {
        self.mae.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
    }

    pub fn r2_text(&self) -> String {
        percent_text(self.r2_percent)
    }

    pub fn mape_text(&self) -> String {
        percent_text(self.mape_percent)
    }
}

fn percent_text(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}%"))
        .unwrap_or_else(|| "N/A".to_string())
}
