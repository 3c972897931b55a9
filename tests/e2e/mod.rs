mod preprocessor;
