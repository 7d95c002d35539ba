mod game_tests {
    use crate::errors::{ConfigurationError, RehomeError};
    use crate::gamelog::GameStatus;
    use crate::input::{ActionPlanInput, EnvelopeComponent, PlannedAction, WindowType};
    use crate::output::SinkOutput;
    use crate::simulator::INVESTMENT_COST;
    use crate::tests::fixtures::{
        building_input, flat_scenario, synthetic_weather, system_input, user_input,
    };
    use crate::{run_game, Game, GameInputs, GameSettings};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn inputs() -> GameInputs {
        let mut user = user_input();
        user.bank_deposit = 1_000_000.;

        GameInputs {
            building: building_input(),
            user,
            system: system_input(),
            scenario: flat_scenario(),
            weather: (*synthetic_weather()).clone(),
            plan: Default::default(),
        }
    }

    fn settings(end_year: u32) -> GameSettings {
        GameSettings {
            end_year,
            seed: Some(42),
            ..Default::default()
        }
    }

    #[rstest]
    fn test_play_to_the_end(inputs: GameInputs) {
        let mut game = Game::new(inputs, settings(2026)).unwrap();
        let mut years = vec![];

        let status = game
            .play(|results| {
                years.push(results.year);
                Ok(())
            })
            .unwrap();

        assert_eq!(status, GameStatus::Running);
        assert_eq!(years, vec![2022, 2023, 2024, 2025, 2026]);
        assert_eq!(game.log().rows().len(), 6);
        assert_eq!(game.log().rows()[0].year, 2021);
        assert!(game.is_finished());
        assert!(game.design_heat_load() > 0.);
    }

    #[rstest]
    fn test_bank_deposit_follows_ledger(inputs: GameInputs) {
        let mut game = Game::new(inputs, settings(2024)).unwrap();

        let results = game.play_year().unwrap();

        let row = game.log().last();
        assert_eq!(row.bank_deposit, 1_000_000. + results.balance());
        assert_eq!(game.household().user.bank_deposit(), row.bank_deposit);
        assert!(game.household().user.transactions.entries().is_empty());
        assert_eq!(game.year(), 2023);
    }

    #[rstest]
    fn test_same_seed_same_game(inputs: GameInputs) {
        let play = |inputs: GameInputs| {
            let mut game = Game::new(inputs, settings(2031)).unwrap();
            game.play(|_| Ok(())).unwrap();
            game.log().rows().to_vec()
        };

        assert_eq!(play(inputs.clone()), play(inputs));
    }

    #[rstest]
    fn test_co2_budget_exceeded(inputs: GameInputs) {
        let settings = GameSettings {
            co2_budget: 0.1,
            ..settings(2030)
        };
        let mut game = Game::new(inputs, settings).unwrap();

        assert_eq!(game.play(|_| Ok(())).unwrap(), GameStatus::CO2BudgetExceeded);
        assert_eq!(game.log().last().year, 2022);
        assert!(game.play_year().is_err());
    }

    #[rstest]
    fn test_bank_account_empty(mut inputs: GameInputs) {
        inputs.user.bank_deposit = 0.;
        inputs.user.monthly_living_cost = 100_000.;
        let mut game = Game::new(inputs, settings(2030)).unwrap();

        assert_eq!(game.play(|_| Ok(())).unwrap(), GameStatus::BankAccountEmpty);
    }

    #[rstest]
    fn test_comfort_violated(mut inputs: GameInputs) {
        inputs.user.comfort_temperature = 25.;
        let mut game = Game::new(inputs, settings(2030)).unwrap();

        assert_eq!(game.play(|_| Ok(())).unwrap(), GameStatus::ComfortViolated);
        assert_eq!(game.log().last().year, 2024);
        assert_eq!(game.log().last().comfort(), "");
    }

    #[rstest]
    fn test_planned_action_in_its_year(mut inputs: GameInputs) {
        inputs.plan = ActionPlanInput(IndexMap::from([(
            2023,
            vec![PlannedAction::ChangeWindows {
                window_type: WindowType::TripleGlazed,
            }],
        )]));
        let mut game = Game::new(inputs, settings(2024)).unwrap();

        let first_year = game.play_year().unwrap();
        assert_eq!(first_year.economy[INVESTMENT_COST], 0.);
        assert_ne!(
            game.household().building.envelope.window_type(),
            WindowType::TripleGlazed
        );

        let second_year = game.play_year().unwrap();
        assert!(second_year.economy[INVESTMENT_COST] > 0.);
        assert_eq!(
            game.household().building.envelope.window_type(),
            WindowType::TripleGlazed
        );
    }

    #[rstest]
    fn test_adopted_behaviour_restores_comfort(mut inputs: GameInputs) {
        inputs.user.comfort_temperature = 24.;
        inputs.plan = ActionPlanInput(IndexMap::from([(
            2023,
            vec![PlannedAction::AdoptBehaviour {
                set_point_temperature: Some(23.),
                el_demand_reduction: Some(500.),
            }],
        )]));
        let mut game = Game::new(inputs, settings(2025)).unwrap();

        let first_year = game.play_year().unwrap();
        let second_year = game.play_year().unwrap();

        assert_eq!(first_year.comfort_deviation(), 4.);
        assert_eq!(second_year.comfort_deviation(), 1.);
        assert!(
            second_year.building["Heat demand [kWh/a]"] > first_year.building["Heat demand [kWh/a]"]
        );
        // a broken fridge may have saved another 100 kWh/a
        assert!(game.household().user.annual_el_demand() <= 3000.);
        assert_eq!(game.play(|_| Ok(())).unwrap(), GameStatus::Running);
        assert_eq!(game.log().last().comfort(), " =) =)");
    }

    #[rstest]
    fn test_plan_is_checked_before_the_game(mut inputs: GameInputs) {
        inputs.plan = ActionPlanInput(IndexMap::from([(
            2025,
            vec![PlannedAction::Insulate {
                component: EnvelopeComponent::Window,
                thickness_cm: 10.,
            }],
        )]));

        assert!(matches!(
            Game::new(inputs, settings(2030)),
            Err(RehomeError::InvalidInput(ConfigurationError::InvalidValue { .. }))
        ));
    }

    #[rstest]
    fn test_scenario_must_cover_the_game(inputs: GameInputs) {
        let settings = GameSettings {
            end_year: 2200,
            ..Default::default()
        };

        assert!(matches!(
            Game::new(inputs, settings),
            Err(RehomeError::InvalidInput(ConfigurationError::MissingScenarioYear(2101)))
        ));
    }

    #[rstest]
    fn test_run_game(inputs: GameInputs) {
        let log = run_game(
            inputs,
            SinkOutput,
            GameSettings {
                write_hourly: true,
                ..settings(2023)
            },
        )
        .unwrap();

        assert_eq!(log.last().year, 2023);
        assert_eq!(log.status(), GameStatus::Running);
        assert!(log.last().results.contains_key("Heat demand [kWh/a]"));
        assert!(log.last().results.contains_key("Energy Gas boiler [Wh]"));
    }
}
