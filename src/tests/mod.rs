mod test_game;
